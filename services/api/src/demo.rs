use crate::doctors::render_contacts;
use crate::infra::parse_answer_script;
use chrono::Utc;
use clap::Args;
use photoguard::assessment::{
    self, AnswerValue, AssessmentResult, AttachmentRef, ControllerPhase, QuestionKind,
    QuestionnaireController, QuestionnaireError, TierTable, TriageResolver, MEDICAL_WARNING,
};
use photoguard::config::AppConfig;
use photoguard::error::AppError;
use photoguard::store::{
    AssessmentRecord, DoctorContact, JsonFileStore, PhoneNumber, StateStore, StoreError,
};
use std::io::{self, BufRead, Write};

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Phone number to associate with this device (10 digits)
    #[arg(long)]
    pub(crate) phone: Option<String>,
    /// Continue a previously saved, unfinished assessment
    #[arg(long)]
    pub(crate) resume: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Answers in question order, e.g. `yyynnnnnnnnnnnn`
    #[arg(long)]
    pub(crate) answers: String,
    /// Save the result as the latest assessment in the state store
    #[arg(long)]
    pub(crate) record: bool,
}

enum Reply {
    Answer(AnswerValue),
    Quit,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs { phone, resume } = args;

    let config = AppConfig::load()?;
    let resolver = assessment::load(&config.assessment)?;
    let store = JsonFileStore::open(config.storage.state_path.clone())?;

    if let Some(raw) = phone {
        store.set_phone_number(PhoneNumber::parse(&raw)?)?;
    }
    if let Some(phone) = store.phone_number()? {
        println!("Signed in as {}", phone.masked());
    }

    let mut controller = QuestionnaireController::new(resolver.shared_question_set());
    if let Some(notice) = begin_run(&store, &mut controller, resume)? {
        println!("{notice}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    while controller.phase() == ControllerPhase::InProgress {
        let question = controller.current_question()?.clone();
        if let Some(progress) = controller.progress() {
            println!();
            println!(
                "Question {} of {} ({:.0}%)",
                progress.position, progress.total, progress.percent
            );
        }
        if let Some(section) = &question.section {
            println!("[{section}]");
        }
        println!("{}", question.text);

        match prompt(&mut input, question.kind)? {
            Reply::Quit => {
                store.save_progress(controller.answers())?;
                println!("Progress saved. Run `photoguard assess --resume` to continue.");
                return Ok(());
            }
            Reply::Answer(value) => {
                controller.submit_answer(value)?;
                store.save_progress(controller.answers())?;
            }
        }
    }

    let result = resolver.build_result(controller.completed_answers()?)?;
    store.record_assessment(AssessmentRecord::from_result(&result, Utc::now()))?;
    store.clear_progress()?;
    let contacts = urgent_contacts(&store, &result)?;
    render_result(&result, &contacts);
    Ok(())
}

/// Resumes or discards saved progress and leaves `controller` running. Returns
/// a notice whenever saved answers were found.
fn begin_run<S: StateStore>(
    store: &S,
    controller: &mut QuestionnaireController,
    resume: bool,
) -> Result<Option<String>, AppError> {
    let saved = store.saved_progress()?;
    if saved.is_empty() {
        controller.start()?;
        return Ok(None);
    }

    let count = saved.len();
    if resume {
        controller.restore(saved)?;
        return Ok(Some(format!("Resuming saved assessment ({count} answers).")));
    }

    store.clear_progress()?;
    controller.start()?;
    Ok(Some(format!(
        "Discarding an unfinished assessment ({count} answers saved). \
         Use --resume to continue it instead."
    )))
}

fn prompt(input: &mut impl BufRead, kind: QuestionKind) -> Result<Reply, AppError> {
    loop {
        match kind {
            QuestionKind::YesNo => print!("Answer [y/n, q to quit]: "),
            QuestionKind::Attachment => print!("Photo path (Enter to skip, q to quit): "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Reply::Quit);
        }
        let reply = line.trim();

        if reply.eq_ignore_ascii_case("q") {
            return Ok(Reply::Quit);
        }

        match kind {
            QuestionKind::YesNo => match reply.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Reply::Answer(AnswerValue::yes())),
                "n" | "no" => return Ok(Reply::Answer(AnswerValue::no())),
                _ => println!("Please answer y or n."),
            },
            QuestionKind::Attachment => {
                let reference = (!reply.is_empty()).then(|| AttachmentRef(reply.to_string()));
                return Ok(Reply::Answer(AnswerValue::Attachment { reference }));
            }
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { answers, record } = args;
    let answers = parse_answer_script(&answers)
        .map_err(|reason| QuestionnaireError::InvalidAnswer { reason })?;

    let config = AppConfig::load()?;
    let resolver = assessment::load(&config.assessment)?;
    let result = score_script(&resolver, &answers)?;

    let mut contacts = Vec::new();
    if record || result.tier.is_urgent {
        let store = JsonFileStore::open(config.storage.state_path.clone())?;
        if record {
            store.record_assessment(AssessmentRecord::from_result(&result, Utc::now()))?;
        }
        contacts = urgent_contacts(&store, &result)?;
    }

    render_result(&result, &contacts);
    Ok(())
}

/// Feeds a scripted sequence through a fresh controller. Attachment steps are
/// acknowledged without consuming a scripted answer.
fn score_script(resolver: &TriageResolver, answers: &[bool]) -> Result<AssessmentResult, AppError> {
    let expected = resolver.question_set().count_scorable();
    if answers.len() != expected {
        return Err(QuestionnaireError::InvalidAnswer {
            reason: format!(
                "expected {expected} y/n answers, one per question, but got {}",
                answers.len()
            ),
        }
        .into());
    }

    let mut controller = QuestionnaireController::new(resolver.shared_question_set());
    controller.start()?;

    let mut scripted = answers.iter().copied();
    while controller.phase() == ControllerPhase::InProgress {
        let value = match controller.current_question()?.kind {
            QuestionKind::Attachment => AnswerValue::acknowledged(),
            QuestionKind::YesNo => scripted.next().map(AnswerValue::from).ok_or_else(|| {
                QuestionnaireError::InvalidAnswer {
                    reason: format!("expected {expected} y/n answers"),
                }
            })?,
        };
        controller.submit_answer(value)?;
    }

    Ok(resolver.build_result(controller.completed_answers()?)?)
}

/// Saved contacts of the signed-in respondent, only for urgent tiers.
fn urgent_contacts<S: StateStore>(
    store: &S,
    result: &AssessmentResult,
) -> Result<Vec<DoctorContact>, StoreError> {
    if !result.tier.is_urgent {
        return Ok(Vec::new());
    }
    match store.phone_number()? {
        Some(owner) => store.doctors(&owner),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn run_tiers() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let resolver = assessment::load(&config.assessment)?;
    render_tiers(resolver.table());
    Ok(())
}

pub(crate) fn run_status() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = JsonFileStore::open(config.storage.state_path.clone())?;

    match store.phone_number()? {
        Some(phone) => println!("Phone: {}", phone.masked()),
        None => println!("Phone: not signed in"),
    }
    match store.latest_assessment()? {
        Some(record) => println!(
            "Latest assessment: {} ({} of {} yes) on {}{}",
            record.tier_label,
            record.yes_count,
            record.scorable_count,
            record.completed_at.format("%Y-%m-%d %H:%M UTC"),
            if record.is_urgent { " [urgent]" } else { "" }
        ),
        None => println!("Latest assessment: none"),
    }
    let saved = store.saved_progress()?;
    if !saved.is_empty() {
        println!("Unfinished assessment: {} answers saved", saved.len());
    }
    Ok(())
}

pub(crate) fn run_logout() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = JsonFileStore::open(config.storage.state_path.clone())?;
    store.clear_phone_number()?;
    println!("Signed out.");
    Ok(())
}

fn render_result(result: &AssessmentResult, contacts: &[DoctorContact]) {
    let tier = &result.tier;
    println!();
    println!("Assessment Complete!");
    println!("{}", tier.label);
    println!(
        "(Count: {} 'Yes' answers, range {})",
        result.yes_count,
        tier.range_label()
    );
    println!();
    println!("Suggested Next Steps");
    println!("{}", tier.guidance_text);

    if tier.is_urgent {
        println!();
        if contacts.is_empty() {
            println!("Please contact a doctor or pharmacist as soon as possible.");
            println!("Save contacts with `photoguard doctors add` to see them here next time.");
        } else {
            println!("Please contact one of your saved doctors or pharmacists now:");
            render_contacts(contacts);
        }
    }

    if !tier.recommended_actions.is_empty() {
        println!();
        if let Some(heading) = &tier.actions_heading {
            println!("{heading}:");
        }
        for action in &tier.recommended_actions {
            println!("  - {action}");
        }
        if let Some(note) = &tier.actions_note {
            println!("{note}");
        }
    }

    println!();
    println!("{MEDICAL_WARNING}");
}

fn render_tiers(table: &TierTable) {
    for tier in table.tiers() {
        println!(
            "{:<10} {:<18} {}{}",
            tier.key,
            tier.range_label(),
            tier.label,
            if tier.is_urgent { " [urgent]" } else { "" }
        );
    }
}
