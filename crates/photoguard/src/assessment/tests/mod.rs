mod common;
mod controller;
mod triage;
