use std::path::Path;

use storyline_core::{AudioClip, ClipId, SourceId};
use storyline_services::{probe_duration, resolve_url};

use super::{LegacyTrack, StorylineApp};

fn source_for(path: &Path) -> SourceId {
    SourceId(path.to_string_lossy().into_owned())
}

/// Continuous track for `path`, or `None` if its length cannot be read
pub(super) fn probe_legacy(path: &Path) -> Option<LegacyTrack> {
    match probe_duration(path) {
        Ok(duration) => Some(LegacyTrack {
            source: source_for(path),
            path: path.to_path_buf(),
            duration,
        }),
        Err(e) => {
            tracing::warn!("Ignoring continuous audio {}: {}", path.display(), e);
            None
        }
    }
}

impl StorylineApp {
    /// Add a WAV file as a new clip starting at the playhead
    pub(super) fn import_wav(&mut self, path: &Path) {
        let duration = match probe_duration(path) {
            Ok(duration) if duration > 0.0 => duration,
            Ok(_) => {
                tracing::warn!("Skipping empty audio file {}", path.display());
                return;
            }
            Err(e) => {
                tracing::error!("Failed to import {}: {}", path.display(), e);
                return;
            }
        };

        let id = ClipId(self.next_clip_id);
        self.next_clip_id += 1;

        let source = source_for(path);
        let mut clip = AudioClip::new(id, source.clone(), self.playhead.current_time(), duration);
        clip.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("Clip {}", id));

        tracing::info!("Imported {} as clip {} ({:.2}s)", path.display(), id, duration);
        self.clips.push(clip);
        self.selected_clip = Some(id);
        self.peaks.request(source, path.to_path_buf());
        self.bump_revision();
    }

    /// Queue peak computation for every clip source and the continuous track
    pub(super) fn request_all_peaks(&mut self) {
        for clip in &self.clips {
            match resolve_url(&clip.source.0) {
                Ok(path) => {
                    self.peaks.request(clip.source.clone(), path);
                }
                Err(e) => tracing::warn!("Clip {} has no local audio: {}", clip.id, e),
            }
        }
        if let Some(legacy) = &self.legacy {
            self.peaks.request(legacy.source.clone(), legacy.path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::AppConfig;
    use crate::app::project::{demo_project, Project};
    use storyline_services::PeakLoader;

    fn write_tone(path: &Path, sample_rate: u32, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(if i % 2 == 0 { 8000i16 } else { -8000 }).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn app(project: Project) -> StorylineApp {
        StorylineApp::with_project(AppConfig::default(), project, PeakLoader::with_worker(None, 20))
    }

    #[test]
    fn test_import_places_clip_at_playhead() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        write_tone(&path, 1000, 2500);

        let mut app = app(demo_project());
        app.playhead.seek(10.0);
        app.import_wav(&path);
        app.import_wav(&path);

        assert_eq!(app.clips.len(), 2);
        let clip = &app.clips[0];
        assert_eq!(clip.name, "voice");
        assert_eq!(clip.start_time, 10.0);
        assert!((clip.duration - 2.5).abs() < 1e-9);
        assert_ne!(app.clips[0].id, app.clips[1].id);
        assert_eq!(app.selected_clip, Some(app.clips[1].id));
        // Both clips share one source and one cached envelope
        assert!(app.peaks.get(&clip.source).is_some());
    }

    #[test]
    fn test_import_missing_file_is_skipped() {
        let mut app = app(demo_project());
        app.import_wav(Path::new("/nonexistent/missing.wav"));
        assert!(app.clips.is_empty());
        assert_eq!(app.revision, 0);
    }

    #[test]
    fn test_continuous_track_extends_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        write_tone(&path, 100, 20_000);

        let project = Project {
            legacy_audio: Some(path),
            ..demo_project()
        };
        let mut app = app(project);
        assert!((app.playhead.duration() - 200.0).abs() < 1e-9);

        app.request_all_peaks();
        let source = app.legacy.as_ref().map(|l| l.source.clone()).unwrap();
        assert!(app.peaks.get(&source).is_some());
    }
}
