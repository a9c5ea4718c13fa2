use crate::models::Assignment;

const BASE_MINUTES: u32 = 30;
const LONG_TEXT_ENTRY: &str = "online_text_entry";

/// Rough minutes-to-complete from point value, description size and
/// whether the assignment expects a written text entry.
pub fn estimate_minutes(assignment: &Assignment) -> u32 {
    let points = assignment.points();
    let description_len = assignment
        .description
        .as_deref()
        .map(|text| text.chars().count())
        .unwrap_or(0);

    let mut minutes = BASE_MINUTES;

    if points > 100.0 {
        minutes += 120;
    } else if points > 50.0 {
        minutes += 60;
    }

    if description_len > 500 {
        minutes += 45;
    } else if description_len > 200 {
        minutes += 30;
    }

    if assignment
        .submission_types
        .iter()
        .any(|kind| kind == LONG_TEXT_ENTRY)
    {
        minutes += 30;
    }

    minutes
}
