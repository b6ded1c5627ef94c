//! Project files: segment list, placed clips and an optional continuous track

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use storyline_core::{AudioClip, LinkedMedia, Segment, SegmentStatus, SourceId};

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub(super) struct Project {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub clips: Vec<AudioClip>,
    /// Single source the segments were cut from, shown when there are no clips
    #[serde(default)]
    pub legacy_audio: Option<PathBuf>,
}

impl Project {
    /// End of the last segment or clip
    pub fn duration(&self) -> f64 {
        let segments = self.segments.iter().map(|s| s.end_time);
        let clips = self.clips.iter().map(|c| c.end_time());
        segments.chain(clips).fold(0.0, f64::max)
    }

    pub fn next_clip_id(&self) -> u64 {
        self.clips.iter().map(|c| c.id.0 + 1).max().unwrap_or(1)
    }
}

pub(super) fn load_project(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading project {}", path.display()))?;
    let mut project: Project = serde_json::from_str(&text)
        .with_context(|| format!("parsing project {}", path.display()))?;

    for segment in &project.segments {
        segment
            .validate()
            .with_context(|| format!("segment {} in {}", segment.index, path.display()))?;
    }
    project
        .segments
        .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    // Relative media paths resolve against the project file
    let base = path.parent().unwrap_or(Path::new("."));
    if let Some(audio) = project.legacy_audio.take() {
        project.legacy_audio = Some(base.join(audio));
    }
    for clip in &mut project.clips {
        if !clip.source.0.contains("://") && Path::new(&clip.source.0).is_relative() {
            clip.source = SourceId(base.join(&clip.source.0).to_string_lossy().into_owned());
        }
    }

    tracing::info!(
        "Loaded project {} ({} segments, {} clips)",
        path.display(),
        project.segments.len(),
        project.clips.len()
    );
    Ok(project)
}

pub(super) fn export_segments(path: &Path, segments: &[Segment]) -> Result<()> {
    let text = serde_json::to_string_pretty(segments)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Twelve short beats so an empty launch still has something to edit
pub(super) fn demo_project() -> Project {
    const TITLES: [&str; 12] = [
        "Cold open",
        "Title card",
        "Morning in the harbour",
        "The letter",
        "Market crowd",
        "Chase through the alleys",
        "Rooftops",
        "Quiet conversation at the lighthouse",
        "Storm",
        "Aftermath",
        "Homecoming",
        "Credits",
    ];
    const LENGTHS: [f64; 12] = [4.0, 3.0, 9.5, 6.0, 7.5, 12.0, 5.0, 14.0, 8.0, 6.5, 9.0, 10.0];

    let mut start = 0.0;
    let mut segments = Vec::with_capacity(TITLES.len());
    for (index, (title, length)) in TITLES.iter().zip(LENGTHS).enumerate() {
        let end = start + length;
        let status = match index % 4 {
            0 => SegmentStatus::Ready,
            1 => SegmentStatus::Generating,
            2 => SegmentStatus::Pending,
            _ => SegmentStatus::Failed,
        };
        let media = (index == 5).then(|| LinkedMedia {
            label: "chase_take3".to_string(),
            path: None,
        });
        segments.push(Segment {
            index: index + 1,
            start_time: start,
            end_time: end,
            title: (*title).to_string(),
            status,
            media,
        });
        start = end;
    }

    Project {
        segments,
        clips: Vec::new(),
        legacy_audio: None,
    }
}
