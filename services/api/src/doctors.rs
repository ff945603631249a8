use clap::{Args, Subcommand};
use photoguard::config::AppConfig;
use photoguard::error::AppError;
use photoguard::store::{ContactRole, DoctorContact, DoctorDetails, JsonFileStore, StateStore};

#[derive(Args, Debug)]
pub(crate) struct DoctorsArgs {
    #[command(subcommand)]
    pub(crate) command: DoctorsCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DoctorsCommand {
    /// List the contacts saved for the signed-in phone number
    List,
    /// Save a doctor or pharmacist contact
    Add(AddDoctorArgs),
    /// Delete a saved contact by id
    Remove {
        /// Contact id as shown by `doctors list`, e.g. `doc-0001`
        id: String,
    },
}

#[derive(Args, Debug)]
pub(crate) struct AddDoctorArgs {
    /// doctor or pharmacist
    #[arg(long, default_value = "doctor")]
    pub(crate) role: ContactRole,
    #[arg(long)]
    pub(crate) name: String,
    /// Store or clinic name
    #[arg(long)]
    pub(crate) store_name: String,
    /// e.g. Dermatology, Pharmacology
    #[arg(long)]
    pub(crate) specialty: String,
    /// Years of experience (0-50)
    #[arg(long)]
    pub(crate) experience: u8,
    /// City, State
    #[arg(long)]
    pub(crate) location: String,
    #[arg(long)]
    pub(crate) email: String,
    /// The contact's phone number
    #[arg(long)]
    pub(crate) phone: String,
    /// Medical degrees, certifications, etc.
    #[arg(long)]
    pub(crate) qualifications: String,
}

impl From<AddDoctorArgs> for DoctorDetails {
    fn from(args: AddDoctorArgs) -> Self {
        Self {
            role: args.role,
            name: args.name,
            store_name: args.store_name,
            specialty: args.specialty,
            experience_years: args.experience,
            location: args.location,
            email: args.email,
            phone: args.phone,
            qualifications: args.qualifications,
        }
    }
}

pub(crate) fn run_doctors(args: DoctorsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = JsonFileStore::open(config.storage.state_path.clone())?;
    execute(&store, args.command)
}

fn execute<S: StateStore>(store: &S, command: DoctorsCommand) -> Result<(), AppError> {
    let owner = store.phone_number()?.ok_or(AppError::NotSignedIn)?;

    match command {
        DoctorsCommand::List => {
            let contacts = store.doctors(&owner)?;
            if contacts.is_empty() {
                println!("No doctors registered with your account yet.");
            } else {
                println!("You have registered {} contact(s)", contacts.len());
                render_contacts(&contacts);
            }
        }
        DoctorsCommand::Add(args) => {
            let contact = store.add_doctor(&owner, args.into())?;
            println!("Saved {} as {}.", contact.display_name(), contact.id);
        }
        DoctorsCommand::Remove { id } => {
            if store.remove_doctor(&owner, &id)? {
                println!("Removed {id}.");
            } else {
                println!("No saved contact with id {id}.");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_contacts(contacts: &[DoctorContact]) {
    for contact in contacts {
        let details = &contact.details;
        println!(
            "  [{}] {} ({}, {})",
            contact.id,
            contact.display_name(),
            details.role,
            details.specialty
        );
        println!(
            "        {}, {} | {} years experience",
            details.store_name, details.location, details.experience_years
        );
        println!("        {} | {}", details.phone, details.email);
    }
}
