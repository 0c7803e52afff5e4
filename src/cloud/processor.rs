//! Cloud-side transform execution
//!
//! Unlike the device tier, the cloud never rewrites the uploaded file: the
//! processed scene is written as a separate output artifact under the
//! tenant's storage directory.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::error::Error;
use crate::processor::{transform_blocks, ProcessingStats, ProcessorConfig};
use crate::scene::{read_blocks, write_blocks};
use crate::stroke::Preset;

use super::job::Job;
use super::storage::{FileRole, Storage};

/// Process a job's uploaded scene and store the result
///
/// Returns the output path and the per-stage counters. Every failure mode
/// carries a human-readable cause that lands in the job record.
pub fn run_transform(job: &Job, storage: &Storage) -> Result<(PathBuf, ProcessingStats), Error> {
    let start = Instant::now();

    let preset = Preset::get(&job.preset);
    info!(
        job_id = %job.job_id,
        preset = preset.name,
        input = %job.input_path.display(),
        "processing upload"
    );

    let data = fs::read(&job.input_path).map_err(|source| Error::IoRead {
        path: job.input_path.clone(),
        source,
    })?;
    let mut blocks = read_blocks(&data)?;

    let config = ProcessorConfig {
        pipeline: preset.pipeline_config(),
        ..Default::default()
    };
    let mut stats = transform_blocks(&mut blocks, &config);

    let output = write_blocks(&blocks)?;
    let output_path = storage.save(
        &job.tenant_id,
        job.job_id,
        FileRole::Output,
        &job.input_filename,
        &output,
    )?;

    stats.processing_time_ms = Some(start.elapsed().as_millis() as u64);
    info!(
        job_id = %job.job_id,
        processed = stats.strokes_processed,
        skipped = stats.strokes_skipped,
        elapsed_ms = stats.processing_time_ms,
        "upload processed"
    );

    Ok((output_path, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Block, LineItemBlock};
    use crate::stroke::{Point, Stroke};
    use tempfile::TempDir;

    fn wavy_scene_bytes() -> Vec<u8> {
        let coords = [
            (10.0, 10.0),
            (20.0, 15.0),
            (30.0, 8.0),
            (40.0, 18.0),
            (50.0, 12.0),
            (60.0, 16.0),
            (70.0, 10.0),
        ];
        let stroke = Stroke {
            tool: 2,
            color: 0,
            points: coords
                .iter()
                .map(|&(x, y)| Point {
                    x,
                    y,
                    speed: 1,
                    direction: 0,
                    width: 2,
                    pressure: 128,
                })
                .collect(),
        };
        write_blocks(&[Block::LineItem(LineItemBlock {
            node_id: 2,
            item_index: 1,
            line: Some(stroke),
        })])
        .unwrap()
    }

    fn job_with_input(dir: &TempDir, bytes: &[u8]) -> Job {
        let input = dir.path().join("upload.rm");
        fs::write(&input, bytes).unwrap();
        Job::new("tenant-a", "medium", "doc.rm", input)
    }

    #[test]
    fn test_transform_writes_output_artifact() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("store")).unwrap();
        let job = job_with_input(&dir, &wavy_scene_bytes());

        let (output_path, stats) = run_transform(&job, &storage).unwrap();

        assert!(output_path.exists());
        assert_eq!(stats.strokes_processed, 1);
        assert!(stats.processing_time_ms.is_some());

        // Output decodes to the same block count as the input
        let blocks = read_blocks(&fs::read(&output_path).unwrap()).unwrap();
        assert_eq!(blocks.len(), 1);

        // And it is findable through storage
        let found = storage
            .find_file("tenant-a", job.job_id, FileRole::Output)
            .unwrap();
        assert_eq!(found, output_path);
    }

    #[test]
    fn test_missing_input_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("store")).unwrap();
        let job = Job::new(
            "tenant-a",
            "medium",
            "doc.rm",
            dir.path().join("missing.rm"),
        );
        assert!(matches!(
            run_transform(&job, &storage),
            Err(Error::IoRead { .. })
        ));
    }

    #[test]
    fn test_garbage_input_is_a_codec_error() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("store")).unwrap();
        let job = job_with_input(&dir, b"definitely not a scene");
        assert!(matches!(
            run_transform(&job, &storage),
            Err(Error::CodecRead(_))
        ));
    }
}
