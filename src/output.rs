//! CLI output formatting for a sticker run.
//!
//! Each pipeline event becomes one header line plus optional indented
//! detail lines:
//!
//! ```text
//! Source 3000x1200 (RGB)
//! Crop 1200x1200 at (900, 0) [1:1]
//! Background removed
//! Text bottom at (520, 1126) 160x64 [DejaVuSans.ttf]
//! Sticker xtickr_sticker_3fa9c01e.webp
//!     Path: ./xtickr_sticker_3fa9c01e.webp
//!     Quality: 70 (3 attempts)
//!     Size: 98.2 KiB / 100.0 KiB
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers
//! write them to stdout.

use crate::imaging::{Artifact, TextOutcome};
use crate::pipeline::PipelineEvent;

/// Bytes as KiB with one decimal.
fn kib(bytes: u64) -> String {
    format!("{:.1} KiB", bytes as f64 / 1024.0)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Lines describing an exported sticker.
pub fn format_artifact(artifact: &Artifact) -> Vec<String> {
    let mut lines = vec![
        format!("Sticker {}", artifact.file_name),
        format!("{}Path: {}", indent(1), artifact.path.display()),
        format!(
            "{}Quality: {} ({} {})",
            indent(1),
            artifact.quality.value(),
            artifact.attempts.len(),
            if artifact.attempts.len() == 1 {
                "attempt"
            } else {
                "attempts"
            }
        ),
        format!(
            "{}Size: {} / {}",
            indent(1),
            kib(artifact.bytes),
            kib(artifact.max_bytes)
        ),
    ];
    if !artifact.within_limit {
        lines.push(format!(
            "{}Warning: still above the size limit at the lowest quality",
            indent(1)
        ));
    }
    lines
}

/// Lines for a single pipeline event.
pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Loaded {
            width,
            height,
            has_alpha,
        } => vec![format!(
            "Source {}x{} ({})",
            width,
            height,
            if *has_alpha { "RGBA" } else { "RGB" }
        )],
        PipelineEvent::Cropped { rect, aspect } => vec![format!("Crop {} [{}]", rect, aspect)],
        PipelineEvent::BackgroundRemoved => vec!["Background removed".to_string()],
        PipelineEvent::BackgroundKept => vec!["Background kept".to_string()],
        PipelineEvent::Text(TextOutcome::Skipped) => vec!["Text none".to_string()],
        PipelineEvent::Text(TextOutcome::Drawn {
            font,
            anchor,
            position,
            size,
        }) => vec![format!(
            "Text {} at ({}, {}) {}x{} [{}]",
            anchor, position.0, position.1, size.0, size.1, font
        )],
        PipelineEvent::CustomPlacementPreview => vec![format!(
            "{}Note: custom placement is preview-only; text is drawn centered",
            indent(1)
        )],
        PipelineEvent::PreviewWritten { path } => {
            vec![format!("Preview {}", path.display())]
        }
        PipelineEvent::Exported(artifact) => format_artifact(artifact),
    }
}

/// Lines for a whole run, in event order.
pub fn format_run(events: &[PipelineEvent]) -> Vec<String> {
    events.iter().flat_map(format_event).collect()
}

/// Print a run report to stdout.
pub fn print_run(events: &[PipelineEvent]) {
    for line in format_run(events) {
        println!("{}", line);
    }
}

/// Print the prompt for a run that is waiting on the user.
pub fn print_prompt(prompt: &str) {
    eprintln!("{}", prompt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{EncodeAttempt, Quality};
    use crate::types::{Anchor, AspectRatio, CropRect};
    use std::path::PathBuf;

    fn artifact(within_limit: bool, attempts: usize) -> Artifact {
        Artifact {
            file_name: "xtickr_sticker_0badf00d.webp".to_string(),
            path: PathBuf::from("out/xtickr_sticker_0badf00d.webp"),
            width: 512,
            height: 512,
            quality: Quality::new(70),
            bytes: 51_200,
            max_bytes: 102_400,
            within_limit,
            attempts: vec![
                EncodeAttempt {
                    quality: Quality::new(70),
                    bytes: 51_200,
                };
                attempts
            ],
        }
    }

    #[test]
    fn artifact_lines() {
        let lines = format_artifact(&artifact(true, 3));
        assert_eq!(
            lines,
            vec![
                "Sticker xtickr_sticker_0badf00d.webp",
                "    Path: out/xtickr_sticker_0badf00d.webp",
                "    Quality: 70 (3 attempts)",
                "    Size: 50.0 KiB / 100.0 KiB",
            ]
        );
    }

    #[test]
    fn single_attempt_is_singular() {
        let lines = format_artifact(&artifact(true, 1));
        assert_eq!(lines[2], "    Quality: 70 (1 attempt)");
    }

    #[test]
    fn oversized_artifact_warns() {
        let lines = format_artifact(&artifact(false, 8));
        assert!(lines.last().unwrap().contains("above the size limit"));
    }

    #[test]
    fn run_lines_follow_event_order() {
        let events = vec![
            PipelineEvent::Loaded {
                width: 300,
                height: 200,
                has_alpha: false,
            },
            PipelineEvent::Cropped {
                rect: CropRect {
                    x: 50,
                    y: 0,
                    width: 200,
                    height: 200,
                },
                aspect: AspectRatio::Square,
            },
            PipelineEvent::BackgroundKept,
            PipelineEvent::Text(TextOutcome::Drawn {
                font: "built-in 8x8".to_string(),
                anchor: Anchor::Bottom,
                position: (92, 182),
                size: (16, 8),
            }),
        ];
        assert_eq!(
            format_run(&events),
            vec![
                "Source 300x200 (RGB)",
                "Crop 200x200 at (50, 0) [1:1]",
                "Background kept",
                "Text bottom at (92, 182) 16x8 [built-in 8x8]",
            ]
        );
    }

    #[test]
    fn custom_placement_note_is_indented() {
        let lines = format_event(&PipelineEvent::CustomPlacementPreview);
        assert!(lines[0].starts_with("    Note:"));
    }
}
