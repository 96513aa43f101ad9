//! HTML rendering for the screening form and its result states.
//!
//! A page is always in exactly one of three states: fresh (no result
//! section), verdict (label plus tallies), or failed (message, no
//! tallies).

use crate::types::verdict::Verdict;
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Form fields with their display labels, in schema order
const FIELD_LABELS: [(&str, &str); 8] = [
    ("gender", "Gender"),
    ("age", "Age"),
    ("hypertension", "Hypertension (0/1)"),
    ("heart_disease", "Heart disease (0/1)"),
    ("smoking_history", "Smoking history"),
    ("bmi", "BMI"),
    ("HbA1c_level", "HbA1c level"),
    ("blood_glucose_level", "Blood glucose level"),
];

const STYLE: &str = "
    body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
    form { display: grid; grid-template-columns: 14rem 1fr; gap: 0.5rem; }
    button { grid-column: 2; width: 8rem; }
    section.verdict { border: 1px solid #2a7; padding: 1rem; margin-top: 1.5rem; }
    section.failure { border: 1px solid #c33; padding: 1rem; margin-top: 1.5rem; color: #c33; }
";

/// What the page shows below the form
pub enum Page {
    /// First load: no result section at all
    Fresh,
    /// A successful prediction: majority label and tallies
    Result(Verdict),
    /// A failed prediction: message, no tallies
    Failed(String),
}

/// Render the full screening page in the given state.
pub fn index(page: &Page) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Diabetes Screening" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Diabetes Screening" }
                form method="post" action="/predict" {
                    @for (name, label) in &FIELD_LABELS {
                        label for=(name) { (label) }
                        input type="text" id=(name) name=(name);
                    }
                    button type="submit" { "Predict" }
                }
                @match page {
                    Page::Fresh => {}
                    Page::Result(verdict) => {
                        section class="verdict" {
                            h2 { (verdict.outcome) }
                            p {
                                "Positive votes: " (verdict.tally.positives)
                                ", negative votes: " (verdict.tally.negatives)
                                ", models: " (verdict.tally.total)
                            }
                        }
                    }
                    Page::Failed(message) => {
                        section class="failure" {
                            p { (message) }
                        }
                    }
                }
            }
        }
    }
}
