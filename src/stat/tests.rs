use super::*;

mod entry_parse_tests {
    use super::*;

    // two examples provided in the `proc_stat(5)` man page.
    const EXAMPLE_1: &str = "cpu 10132153 290696 3084719 46828483 16683 0 25195 0 175628 0";
    const EXAMPLE_2: &str = "cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0";

    #[test]
    fn example_1() {
        let entry = EXAMPLE_1.parse::<Entry>().unwrap();
        let time = CpuTime::from([10132153, 290696, 3084719, 46828483, 16683, 0, 25195, 0]);
        assert_eq!(entry, Entry::AllCpu { time });
    }

    #[test]
    fn example_2() {
        let entry = EXAMPLE_2.parse::<Entry>().unwrap();
        let time = CpuTime::from([1393280, 32966, 572056, 13343292, 6130, 0, 17875, 0]);
        assert_eq!(
            entry,
            Entry::Cpu {
                id: CpuId(0),
                time
            }
        );
    }

    /// the aggregate line is padded with two spaces.
    #[test]
    fn example_3() {
        const EXAMPLE_3: &str = "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0";
        let _ = EXAMPLE_3.parse::<Entry>().unwrap();
    }

    /// kernels older than 2.6.24 do not report guest time.
    #[test]
    fn eight_times() {
        let entry = "cpu3 1 2 3 4 5 6 7 8".parse::<Entry>().unwrap();
        let time = CpuTime::from([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            entry,
            Entry::Cpu {
                id: CpuId(3),
                time
            }
        );
    }

    #[test]
    fn tabs() {
        let entry = "cpu1\t1\t2\t3\t4\t5\t6\t7\t8".parse::<Entry>().unwrap();
        assert!(matches!(entry, Entry::Cpu { id: CpuId(1), .. }));
    }

    #[test]
    fn bad_cpu_id() {
        let err = "cpuA 0 0 0 0 0 0 0 0 0 0".parse::<Entry>().unwrap_err();
        assert!(matches!(err, EntryParseError::CpuIdParse(_)));
    }

    #[test]
    fn bad_time() {
        let err = "cpu0 0 0 0 zero 0 0 0 0".parse::<Entry>().unwrap_err();
        assert!(matches!(err, EntryParseError::UserHzParse(_)));
    }

    #[test]
    fn negative_time() {
        let err = "cpu0 0 0 0 -1 0 0 0 0".parse::<Entry>().unwrap_err();
        assert!(matches!(err, EntryParseError::UserHzParse(_)));
    }

    /// parse a cpu entry that is missing one of its times.
    #[test]
    fn missing_time() {
        const ENTRY: &str = "cpu 10132153 290696 3084719 46828483 16683 0 25195";
        let err = ENTRY.parse::<Entry>().unwrap_err();
        assert_eq!(err, EntryParseError::CpuTime { found: 7 });
    }

    /// parse a cpu entry that has one too many times.
    #[test]
    fn extra_time() {
        const ENTRY: &str = "cpu 10132153 290696 3084719 46828483 16683 0 25195 0 175628 0 0";
        let err = ENTRY.parse::<Entry>().unwrap_err();
        assert_eq!(err, EntryParseError::CpuTime { found: 11 });
    }

    #[test]
    fn no_times() {
        let err = "cpu".parse::<Entry>().unwrap_err();
        assert_eq!(err, EntryParseError::CpuTime { found: 0 });
    }

    #[test]
    fn other_lines() {
        for line in [
            "page 5741 1808",
            "swap 1 0",
            "intr 1462898",
            "ctxt 115315",
            "btime 769041601",
            "processes 86031",
            "procs_running 6",
            "procs_blocked 2",
            "softirq 229245889 94 60001584 13619 5175704 2471304 28 51212741 59130143 0 51240672",
            "",
        ] {
            assert_eq!(line.parse::<Entry>(), Ok(Entry::Other), "{line:?}");
        }
    }

    /// counters are 64 bits wide.
    #[test]
    fn big() {
        let entry = "cpu  5000000000 5000000000 5000000000 5000000000 5000000000 5000000000 5000000000 0 0 0"
                .parse::<Entry>()
                .unwrap();
        let Entry::AllCpu { time } = entry else {
            panic!("expected the aggregate line, found {entry:?}");
        };
        assert_eq!(time.user, UserHz::from(5_000_000_000));
        assert_eq!(time.non_idle(), 25_000_000_000);
    }
}

mod parse_cpu_id_tests {
    use super::*;

    #[test]
    fn all() {
        assert_eq!(Entry::parse_cpu_id(""), Ok(None));
    }

    #[test]
    fn one() {
        assert_eq!(Entry::parse_cpu_id("1"), Ok(Some(CpuId(1))));
    }

    #[test]
    fn many() {
        assert_eq!(Entry::parse_cpu_id("511"), Ok(Some(CpuId(511))));
    }

    #[test]
    fn a() {
        assert!(matches!(
            Entry::parse_cpu_id("a"),
            Err(EntryParseError::CpuIdParse(_))
        ));
    }
}

mod snapshot_tests {
    use {super::*, crate::source::MockStatFile};

    const STAT: &str = "\
cpu  300 0 150 600 0 0 0 0 0 0
cpu0 100 0 50 200 0 0 0 0 0 0
cpu1 100 0 50 200 0 0 0 0 0 0
cpu2 100 0 50 200 0 0 0 0 0 0
intr 1462898 0 0
ctxt 115315
btime 769041601
processes 86031
procs_running 6
procs_blocked 2
";

    #[test]
    fn reads_every_cpu() {
        let source = MockStatFile::from_iter([STAT]);
        let Snapshot { system, cpus } = Snapshot::read(&source).unwrap();

        assert_eq!(system, CpuTime::from([300, 0, 150, 600, 0, 0, 0, 0]));
        assert_eq!(
            cpus.keys().copied().collect::<Vec<_>>(),
            [CpuId(0), CpuId(1), CpuId(2)]
        );
    }

    /// cpus are ordered by id, not by position in the file.
    #[test]
    fn ascending_order() {
        let stat = "cpu 0 0 0 0 0 0 0 0\ncpu2 2 0 0 0 0 0 0 0\ncpu0 0 0 0 0 0 0 0 0\n";
        let Snapshot { cpus, .. } = stat.parse().unwrap();
        let users = cpus.values().map(|t| t.user).collect::<Vec<_>>();
        assert_eq!(users, [UserHz::from(0), UserHz::from(2)]);
    }

    #[test]
    fn missing_aggregate() {
        let err = "cpu0 0 0 0 0 0 0 0 0\n".parse::<Snapshot>().unwrap_err();
        assert!(matches!(err, StatReadError::MissingAggregate));
    }

    #[test]
    fn duplicate_cpu() {
        let stat = "cpu 0 0 0 0 0 0 0 0\ncpu0 0 0 0 0 0 0 0 0\ncpu0 0 0 0 0 0 0 0 0\n";
        let err = stat.parse::<Snapshot>().unwrap_err();
        assert!(matches!(
            err,
            StatReadError::Duplicate {
                line: 3,
                row: Row::Cpu(CpuId(0))
            }
        ));
    }

    #[test]
    fn malformed_line() {
        let stat = "cpu 0 0 0 0 0 0 0 0\ncpu0 0 0 0\n";
        let err = stat.parse::<Snapshot>().unwrap_err();
        assert!(matches!(
            err,
            StatReadError::Entry {
                line: 2,
                error: EntryParseError::CpuTime { found: 3 }
            }
        ));
    }

    #[test]
    fn unreadable_source() {
        let source = MockStatFile::default();
        let err = Snapshot::read(&source).unwrap_err();
        assert!(matches!(err, StatReadError::Io(_)));
    }
}

mod measurement_tests {
    use super::*;

    fn percentage(previous: [u64; 8], current: [u64; 8]) -> Option<f64> {
        Measurement::new(&previous.into(), &current.into()).percentage()
    }

    #[test]
    fn worked_example() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        let b = [150, 0, 60, 210, 0, 0, 0, 0];
        let percent = percentage(a, b).unwrap();
        assert!((percent - 85.714).abs() < 0.001, "{percent}");
    }

    #[test]
    fn all_idle() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        let b = [100, 0, 50, 300, 0, 0, 0, 0];
        assert_eq!(percentage(a, b), Some(0.0));
    }

    #[test]
    fn all_busy() {
        let a = [100, 0, 50, 200, 7, 0, 0, 0];
        let b = [200, 0, 50, 200, 7, 0, 0, 0];
        assert_eq!(percentage(a, b), Some(100.0));
    }

    #[test]
    fn unchanged() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        assert_eq!(percentage(a, a), None);
    }

    /// the counters went backwards.
    #[test]
    fn regressed() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        let b = [90, 0, 50, 200, 0, 0, 0, 0];
        assert_eq!(percentage(a, b), None);
    }

    /// iowait growing faster than idle would otherwise yield more than 100%.
    #[test]
    fn clamped() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        let b = [110, 0, 50, 205, 10, 0, 0, 0];
        assert_eq!(percentage(a, b), Some(100.0));
    }

    #[test]
    fn any_busy_field_counts() {
        let a = [0, 0, 0, 1000, 0, 0, 0, 0];
        for field in [0, 1, 2, 5, 6, 7] {
            let mut b = a;
            b[3] += 10;
            b[field] += 1;
            let percent = percentage(a, b).unwrap();
            assert!(percent > 0.0, "field {field}: {percent}");
        }
    }

    /// idle excludes iowait, so iowait outgrowing idle by at least the busy time leaves the
    /// total unadvanced, even though no counter went backwards.
    #[test]
    fn iowait_outpacing_busy_time() {
        let a = [100, 0, 50, 200, 0, 0, 0, 0];
        for (busy, iowait) in [(5, 5), (5, 20), (0, 1)] {
            let mut b = a;
            b[0] += busy;
            b[3] += 10;
            b[4] += 10 + iowait;
            assert_eq!(percentage(a, b), None, "busy {busy}, iowait {iowait}");
        }
    }

    /// monotonic counters always land within bounds.
    #[test]
    fn bounded() {
        let mut previous = [0_u64; 8];
        for step in 1..200_u64 {
            let mut current = previous;
            for (i, time) in current.iter_mut().enumerate() {
                // an arbitrary, deterministic spread of increments, leaving iowait fixed.
                if i != 4 {
                    *time += (step * (i as u64 + 3)) % 17;
                }
            }
            if let Some(percent) = percentage(previous, current) {
                assert!((0.0..=100.0).contains(&percent), "{percent}");
            }
            previous = current;
        }
    }
}
