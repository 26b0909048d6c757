//! Plain-text rendering of view models.

use std::fmt::Write as _;

use ui::vm::{DashboardVm, DifficultyVm, NoticeVm, ProgressVm, SummaryVm, TopicsVm};
use ui::{GuardOutcome, Route};

fn summary_line(summary: &SummaryVm) -> String {
    format!(
        "{}/{} done, {} pending ({}%, {})",
        summary.completed, summary.total, summary.pending, summary.percentage, summary.source
    )
}

fn difficulty_line(rows: &[DifficultyVm]) -> String {
    rows.iter()
        .map(|row| format!("{} {}/{} ({}%)", row.level, row.completed, row.total, row.percentage))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn dashboard(vm: &DashboardVm) -> String {
    format!(
        "{}\nProgress: {}\nBy difficulty: {}\nTopics: {} ({} subtopics)\n",
        vm.greeting,
        summary_line(&vm.summary),
        difficulty_line(&vm.by_difficulty),
        vm.topic_count,
        vm.subtopic_count
    )
}

pub fn topics(vm: &TopicsVm) -> String {
    let mut out = String::new();
    for topic in &vm.topics {
        let _ = writeln!(out, "{} [{}] {}/{}", topic.name, topic.id, topic.completed, topic.total);
        for subtopic in &topic.subtopics {
            let mark = if subtopic.done { "x" } else { " " };
            let pending = if subtopic.in_flight { " (saving)" } else { "" };
            let _ = writeln!(
                out,
                "  [{mark}] {} [{}] {}{pending}",
                subtopic.name, subtopic.subtopic_id, subtopic.difficulty
            );
            for link in &subtopic.links {
                let _ = writeln!(out, "        {}: {}", link.label, link.url);
            }
        }
    }
    if vm.topics.is_empty() {
        out.push_str("No topics yet.\n");
    }
    out
}

pub fn progress(vm: &ProgressVm) -> String {
    let mut out = format!("Overall: {}\n", summary_line(&vm.overall));
    for topic in &vm.topics {
        let _ = writeln!(
            out,
            "  {:<24} {:>3}/{:<3} {:>3}%",
            topic.name, topic.completed, topic.total, topic.percentage
        );
        let _ = writeln!(out, "  {:<24} {}", "", difficulty_line(&topic.by_difficulty));
    }
    out
}

pub fn guard(route: &Route, outcome: &GuardOutcome) -> String {
    match outcome {
        GuardOutcome::Render => format!("{route}: render"),
        GuardOutcome::Loading => format!("{route}: loading"),
        GuardOutcome::Redirect(target) => format!("{route}: redirect to {target}"),
    }
}

pub fn notice(vm: &NoticeVm) -> String {
    format!("[{}] {}", vm.level, vm.message)
}
