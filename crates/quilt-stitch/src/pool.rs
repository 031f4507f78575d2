//! Scoped worker pool over the tiles of a grid.
//!
//! Tile indices go out on one channel and results come back on another.
//! The calling thread consumes results as they arrive, so all writes into
//! shared output happen on one thread. The first error raises a cancel
//! flag; workers finish their current tile and stop.

use crate::error::PipelineError;
use log::trace;
use quilt_cover::Tile;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub(crate) fn run<T, W, C>(
    tiles: &[Tile],
    workers: usize,
    work: W,
    mut consume: C,
) -> Result<(), PipelineError>
where
    T: Send,
    W: Fn(&Tile) -> Result<T, PipelineError> + Sync,
    C: FnMut(&Tile, T) -> Result<(), PipelineError>,
{
    let cancel = AtomicBool::new(false);
    let (task_tx, task_rx) = crossbeam_channel::unbounded::<usize>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded();
    for i in 0..tiles.len() {
        // The receiver is alive until the scope below ends.
        let _ = task_tx.send(i);
    }
    drop(task_tx);

    thread::scope(|s| {
        for worker in 0..workers.max(1) {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let (work, cancel) = (&work, &cancel);
            s.spawn(move || {
                while let Ok(i) = task_rx.recv() {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    trace!("worker {worker}: tile {i}");
                    if result_tx.send((i, work(&tiles[i]))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut first_err = None;
        for (i, result) in result_rx.iter() {
            if first_err.is_some() {
                continue;
            }
            if let Err(e) = result.and_then(|v| consume(&tiles[i], v)) {
                cancel.store(true, Ordering::Relaxed);
                first_err = Some(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quilt_core::{Axes, TilingParams};
    use quilt_cover::BlockGrid;

    fn grid() -> BlockGrid {
        let axes = Axes::parse("YX").unwrap();
        BlockGrid::cover(&[200, 200], &axes, &TilingParams::new(40, 0, 0)).unwrap()
    }

    #[test]
    fn every_tile_consumed_once() {
        let grid = grid();
        let mut seen = vec![0usize; grid.len()];
        run(
            grid.tiles(),
            4,
            |t| Ok(t.flat_index() * 2),
            |t, v| {
                assert_eq!(v, t.flat_index() * 2);
                seen[t.flat_index()] += 1;
                Ok(())
            },
        )
        .unwrap();
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn first_error_is_returned() {
        let grid = grid();
        let err = run(
            grid.tiles(),
            3,
            |t| {
                if t.flat_index() == 5 {
                    Err(PipelineError::Config(quilt_core::ConfigError::ZeroGrid))
                } else {
                    Ok(())
                }
            },
            |_, ()| Ok(()),
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::Config(quilt_core::ConfigError::ZeroGrid));
    }
}
