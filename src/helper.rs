use crate::RepeatOption;

/// Display label for a repeat option
pub fn repeat_label(option: RepeatOption) -> &'static str {
    match option {
        RepeatOption::None => "Never",
        RepeatOption::Hourly => "Every hour",
        RepeatOption::Daily => "Every day",
        RepeatOption::Monthly => "Every month",
        RepeatOption::Yearly => "Every year",
    }
}

// Helper for summaries: stored intervals that match no option are shown raw
pub fn describe_interval(repeat_interval: Option<u64>) -> String {
    let seconds = repeat_interval.unwrap_or(0);
    match RepeatOption::from_seconds(seconds) {
        Some(option) => repeat_label(option).to_string(),
        None => format!("Every {} seconds", seconds),
    }
}
