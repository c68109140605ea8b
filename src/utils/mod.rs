use crate::models::ScoredEvent;

/// Share of correct predictions as a percentage, 0 when nothing was scored.
pub fn accuracy_percentage(total_correct: i64, total_predictions: i64) -> f64 {
    if total_predictions <= 0 {
        return 0.0;
    }
    (total_correct as f64) / (total_predictions as f64) * 100.0
}

/// Form string of the last five scored predictions, most recent first ("WLLWW").
pub fn recent_form(events: &[ScoredEvent]) -> String {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.scored_at.cmp(&a.scored_at));

    sorted
        .iter()
        .take(5)
        .map(|e| if e.is_correct { 'W' } else { 'L' })
        .collect()
}

/// Case-insensitive ordering key for display names.
pub fn name_sort_key(display_name: &str) -> String {
    display_name.trim().to_lowercase()
}

/// Validate display name format
pub fn validate_display_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().count() <= 100
}
