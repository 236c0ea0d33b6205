use std::fs;

use strata_comm::{ThreadComm, ThreadGroup};
use strata_core::{Collective, CommError};
use strata_histogram::{
    DataBlock, DistributedHistogram, HistogramAnalysis, HistogramConfig, HistogramError,
    ReportTarget, Validity, ABORT_DEGENERATE_RANGE,
};
use strata_test_utils::fixtures::{random_field, serial_histogram, split_values};
use strata_test_utils::{CollectiveCall, ScriptedComm};

fn run_cycle(comm: &ThreadComm, values: &[f64], bins: usize) -> Result<DistributedHistogram, HistogramError> {
    let mut hist = DistributedHistogram::new();
    hist.add_range(values, None)?;
    hist.pre_compute(comm, bins)?;
    hist.compute(values, None)?;
    hist.post_compute(comm, &ReportTarget::Silent, 0, 0.0, "mesh", "data")?;
    Ok(hist)
}

#[test]
fn threaded_reduction_matches_serial() {
    let values = random_field(42, 1000, -5.0, 5.0);
    let (min, max, expected) = serial_histogram(&values, 16).unwrap();
    let parts = split_values(&values, 4);

    let results = ThreadGroup::run(4, |comm| {
        let hist = run_cycle(&comm, &parts[comm.rank()], 16).unwrap();
        (comm.rank(), hist.histogram(&comm).unwrap())
    });

    for result in results {
        let (rank, snap) = result.unwrap();
        if rank == 0 {
            let snap = snap.unwrap();
            assert_eq!((snap.min, snap.max), (min, max));
            assert_eq!(snap.counts, expected);
            assert_eq!(snap.validity, Validity::Global);
        } else {
            assert!(snap.is_none());
        }
    }
}

#[test]
fn rank_without_data_still_participates() {
    let values: Vec<f64> = (0..10).map(f64::from).chain([10.0]).collect();
    let results = ThreadGroup::run(3, |comm| {
        let local: &[f64] = match comm.rank() {
            0 => &values[..6],
            1 => &[],
            _ => &values[6..],
        };
        let hist = run_cycle(&comm, local, 5).unwrap();
        hist.histogram(&comm).unwrap()
    });
    let root = results.into_iter().next().unwrap().unwrap().unwrap();
    assert_eq!(root.counts, vec![2, 2, 2, 2, 3]);
}

#[test]
fn empty_group_fails_on_every_rank() {
    let results = ThreadGroup::run(3, |comm| {
        let empty: [f64; 0] = [];
        run_cycle(&comm, &empty, 4).map(|_| ())
    });
    for result in results {
        assert!(matches!(
            result.unwrap(),
            Err(HistogramError::DegenerateRange { .. })
        ));
    }
}

#[test]
fn non_root_reports_degenerate_range_without_aborting() {
    let comm = ScriptedComm::new(1, 3).with_empty_peer().with_empty_peer();
    let mut hist = DistributedHistogram::new();
    hist.pre_compute(&comm, 2).unwrap();
    hist.compute(&[1.0], None).unwrap();
    let err = hist
        .post_compute(&comm, &ReportTarget::Silent, 0, 0.0, "m", "a")
        .unwrap_err();
    assert!(matches!(err, HistogramError::DegenerateRange { .. }));
    assert!(comm.aborts().is_empty());
    assert_eq!(comm.calls().len(), 3);
}

#[test]
fn abort_reaches_ranks_waiting_in_next_step() {
    let results = ThreadGroup::run(2, |comm| {
        let config = HistogramConfig::builder()
            .mesh_name("mesh")
            .array_name("data")
            .bins(2)
            .output(ReportTarget::Silent)
            .build()
            .unwrap();
        let mut analysis = HistogramAnalysis::new(config).unwrap();
        let first = analysis.execute(&comm, &[], 0, 0.0);
        let values = vec![1.0f64, 2.0];
        let second = analysis.execute(&comm, &[DataBlock::new(&values)], 1, 0.1);
        (comm.rank(), first.is_err(), second)
    });
    for result in results {
        let (rank, first_failed, second) = result.unwrap();
        assert!(first_failed, "rank {rank}");
        assert!(matches!(
            second,
            Err(HistogramError::Comm(CommError::Aborted {
                code: ABORT_DEGENERATE_RANGE
            }))
        ));
    }
}

#[test]
fn scripted_root_merges_peer_counts() {
    let comm = ScriptedComm::new(0, 3)
        .with_peer_range(-10.0, 0.0)
        .with_empty_peer()
        .with_peer_counts(vec![3, 0])
        .with_peer_counts(vec![0, 0]);
    let mut hist = DistributedHistogram::new();
    hist.add_range(&[5.0, 10.0], None).unwrap();
    hist.pre_compute(&comm, 2).unwrap();
    assert_eq!(hist.range(), (-10.0, 10.0));
    hist.compute(&[5.0, 10.0], None).unwrap();
    hist.post_compute(&comm, &ReportTarget::Silent, 2, 0.2, "m", "a")
        .unwrap();

    let snap = hist.histogram(&comm).unwrap().unwrap();
    assert_eq!(snap.counts, vec![3, 2]);
    assert_eq!(
        comm.calls(),
        vec![
            CollectiveCall::Min,
            CollectiveCall::Max,
            CollectiveCall::Sum { root: 0, len: 2 }
        ]
    );
    assert!(comm.aborts().is_empty());
}

#[test]
fn scripted_non_root_writes_nothing() {
    let tag = format!("strata-nonroot-{}", std::process::id());
    let base = std::env::temp_dir().join(&tag);
    let comm = ScriptedComm::new(1, 2).with_peer_range(0.0, 1.0);
    let mut hist = DistributedHistogram::new();
    hist.add_range(&[0.5], None).unwrap();
    hist.pre_compute(&comm, 2).unwrap();
    hist.compute(&[0.5], None).unwrap();
    hist.post_compute(&comm, &ReportTarget::File(base), 0, 0.0, "m", "a")
        .unwrap();
    assert!(hist.histogram(&comm).unwrap().is_none());
    let would_be = std::env::temp_dir().join(format!("{tag}_m_a_0.txt"));
    assert!(!would_be.exists());
}

#[test]
fn root_writes_report_file() {
    let dir = std::env::temp_dir().join(format!("strata-histogram-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let base = dir.join("hist");

    let values: Vec<f64> = (0..10).map(f64::from).chain([10.0]).collect();
    let parts = split_values(&values, 2);
    let results = ThreadGroup::run(2, |comm| {
        let mut hist = DistributedHistogram::new();
        let local = &parts[comm.rank()];
        hist.add_range(local, None).unwrap();
        hist.pre_compute(&comm, 5).unwrap();
        hist.compute(local, None).unwrap();
        hist.post_compute(&comm, &ReportTarget::File(base.clone()), 12, 0.5, "grid", "temp")
    });
    for result in results {
        result.unwrap().unwrap();
    }

    let written = fs::read_to_string(dir.join("hist_grid_temp_12.txt")).unwrap();
    assert_eq!(
        written,
        "step : 12\n\
         time : 0.5\n\
         num bins : 5\n\
         range : 0 10\n\
         bin edges : 0 2 4 6 8 10 \n\
         counts : 2 2 2 2 3 \n"
    );
    fs::remove_dir_all(&dir).unwrap();
}
