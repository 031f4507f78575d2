//! Comparing label images.

use ndarray::ArrayViewD;
use quilt_stitch::{Detection, StitchedObjects};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Object-level agreement between two label images.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchStats {
    pub n_true: usize,
    pub n_pred: usize,
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    /// `tp / (tp + fp + fn)`; 1 when both images are empty.
    pub accuracy: f64,
    /// Mean IoU of matched pairs over all true objects.
    pub mean_true_score: f64,
}

/// Match objects of `truth` and `pred` one-to-one by IoU.
///
/// Pairs are taken greedily by descending IoU; a pair counts as a true
/// positive when its IoU is at least `thresh`.
pub fn matching(truth: ArrayViewD<'_, u32>, pred: ArrayViewD<'_, u32>, thresh: f64) -> MatchStats {
    assert_eq!(truth.shape(), pred.shape(), "label images differ in shape");
    let mut true_area: HashMap<u32, usize> = HashMap::new();
    let mut pred_area: HashMap<u32, usize> = HashMap::new();
    let mut overlap: HashMap<(u32, u32), usize> = HashMap::new();
    for (&t, &p) in truth.iter().zip(pred.iter()) {
        if t != 0 {
            *true_area.entry(t).or_default() += 1;
        }
        if p != 0 {
            *pred_area.entry(p).or_default() += 1;
        }
        if t != 0 && p != 0 {
            *overlap.entry((t, p)).or_default() += 1;
        }
    }

    let mut pairs: Vec<(f64, u32, u32)> = overlap
        .iter()
        .map(|(&(t, p), &inter)| {
            let union = true_area[&t] + pred_area[&p] - inter;
            (inter as f64 / union as f64, t, p)
        })
        .filter(|&(iou, _, _)| iou >= thresh)
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut used_true = HashMap::new();
    let mut used_pred = HashMap::new();
    let mut score = 0.0;
    for (iou, t, p) in pairs {
        if used_true.contains_key(&t) || used_pred.contains_key(&p) {
            continue;
        }
        used_true.insert(t, p);
        used_pred.insert(p, t);
        score += iou;
    }

    let (n_true, n_pred, tp) = (true_area.len(), pred_area.len(), used_true.len());
    let (fp, fn_) = (n_pred - tp, n_true - tp);
    let denom = tp + fp + fn_;
    MatchStats {
        n_true,
        n_pred,
        tp,
        fp,
        fn_,
        accuracy: if denom == 0 { 1.0 } else { tp as f64 / denom as f64 },
        mean_true_score: if n_true == 0 { 1.0 } else { score / n_true as f64 },
    }
}

/// Whether two label images describe the same partition up to renaming
/// of non-zero labels.
pub fn same_partition(a: ArrayViewD<'_, u32>, b: ArrayViewD<'_, u32>) -> bool {
    if a.shape() != b.shape() {
        return false;
    }
    let mut forward: HashMap<u32, u32> = HashMap::new();
    let mut backward: HashMap<u32, u32> = HashMap::new();
    for (&x, &y) in a.iter().zip(b.iter()) {
        if (x == 0) != (y == 0) {
            return false;
        }
        if x == 0 {
            continue;
        }
        if *forward.entry(x).or_insert(y) != y || *backward.entry(y).or_insert(x) != x {
            return false;
        }
    }
    true
}

/// Accepted objects as detections, sorted by centre, then radii.
pub fn sorted_detections(objects: &StitchedObjects) -> Vec<Detection> {
    let mut out: Vec<Detection> = objects
        .iter()
        .map(|(_, s)| Detection::from_shape(s))
        .collect();
    let key = |x: &Detection| -> Vec<f64> { x.center.iter().chain(&x.radii).copied().collect() };
    out.sort_by(|a, b| {
        key(a)
            .iter()
            .zip(&key(b))
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Panics unless both lists agree field by field within `tol`.
pub fn assert_detections_close(a: &[Detection], b: &[Detection], tol: f64) {
    assert_eq!(a.len(), b.len(), "detection counts differ");
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        let close = |p: &[f64], q: &[f64]| {
            p.len() == q.len() && p.iter().zip(q).all(|(u, v)| (u - v).abs() <= tol)
        };
        assert!(
            close(&x.center, &y.center),
            "detection {i}: centres {:?} vs {:?}",
            x.center,
            y.center
        );
        assert!(close(&x.radii, &y.radii), "detection {i}: radii differ");
        assert!(
            f64::from((x.score - y.score).abs()) <= tol,
            "detection {i}: scores {} vs {}",
            x.score,
            y.score
        );
    }
}
