//! Tests for protocol analysis: schedules and per-container requirements.
mod common;
use common::*;
use fluidmap::prelude::*;

fn names(report: &AnalysisReport) -> Vec<&str> {
    report.containers.iter().map(|c| c.name()).collect()
}

#[cfg(test)]
mod schedule_tests {
    use super::*;

    #[test]
    fn test_switching_flows() {
        let report = analyse(&switching_flows());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[A,B,C,],300 ml/hr},],[{[D,B,C,],300 ml/hr},],]"
        );
        assert_eq!(names(&report), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_parallel_flows_share_one_window() {
        let report = analyse(&parallel_flows());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[A,B,C,],300 ml/hr},{[D,B,C,],300 ml/hr},],]"
        );
    }

    #[test]
    fn test_operations_without_flows_leave_schedule_empty() {
        let report = analyse(&working_ranges());
        assert!(report.schedule.is_empty());
        assert_eq!(report.schedule.to_string(), "[]");
    }

    #[test]
    fn test_if_branches_are_both_scheduled() {
        let report = analyse(&if_normal());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[B,A,],300 ml/hr},],[{[B,C,],300 ml/hr},],]"
        );
    }

    #[test]
    fn test_flow_after_if_overlaps_longest_branch() {
        let report = analyse(&if_collision());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[B,A,],300 ml/hr},],[{[B,C,],300 ml/hr},],[{[B,C,],300 ml/hr},{[D,E,],300 ml/hr},],[{[D,E,],300 ml/hr},],]"
        );
        assert_eq!(names(&report), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_turbidostat_schedule() {
        let report = analyse(&turbidostat());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[media,cell,waste,],300 ml/hr},],]"
        );
        assert_eq!(names(&report), ["cell", "media", "waste"]);
    }

    #[test]
    fn test_turbidostat_with_poison_schedule() {
        let report = analyse(&turbidostat_with_poison());

        assert_eq!(
            report.schedule.to_string(),
            "[[{[media,cell,waste,],300 ml/hr},],[{[poison,cell,waste,],300 ml/hr},],]"
        );
    }

    #[test]
    fn test_switching_loop_alternates_every_iteration() {
        let report = analyse(&switching_loop(2, 200.0));

        assert_eq!(report.schedule.len(), 4);
        assert_eq!(report.schedule.distinct_paths().len(), 2);
        assert_eq!(
            report.schedule.windows()[0].to_string(),
            "[{[media1,cell,waste,],200 ml/hr},]"
        );
    }
}

#[cfg(test)]
mod container_tests {
    use super::*;

    #[test]
    fn test_connections_count_distinct_neighbours() {
        let report = analyse(&switching_flows());
        let b = report.container("B").expect("B is used");

        assert_eq!(b.connections(), 3);
        assert_eq!(b.arriving_connections(), 2);
        assert_eq!(b.leaving_connections(), 1);
        assert_eq!(b.neighbours().collect::<Vec<_>>(), ["A", "C", "D"]);
    }

    #[test]
    fn test_if_connections() {
        let report = analyse(&if_collision());
        let counts: Vec<usize> = report.containers.iter().map(|c| c.connections()).collect();
        assert_eq!(counts, [1, 2, 1, 1, 1]);
    }

    #[test]
    fn test_class_and_ports_follow_usage() {
        let report = analyse(&switching_flows());

        let a = report.container("A").expect("A is used");
        assert_eq!(a.class(), ContainerClass::Open);
        assert_eq!(a.minimum_ports(), 1);

        let b = report.container("B").expect("B is used");
        assert_eq!(b.class(), ContainerClass::Closed);
        assert_eq!(b.minimum_ports(), 2);
    }

    #[test]
    fn test_functions_and_working_ranges() {
        let report = analyse(&working_ranges());
        let a = report.container("A").expect("A is used");

        assert_eq!(a.connections(), 0);
        assert_eq!(a.functions().to_string(), "0100001010100");
        assert_eq!(a.class(), ContainerClass::Closed);
        assert_eq!(a.minimum_ports(), 0);

        let od = a.working_range(Function::MeasureOd).expect("OD range");
        assert_eq!(od.get(Dimension::Wavelength), Some(&Bounds::point(650.0)));

        let spin = a
            .working_range(Function::Centrifugation)
            .expect("centrifugation range");
        assert_eq!(spin.get(Dimension::Frequency), Some(&Bounds::point(50.0)));

        let heat = a.working_range(Function::Heat).expect("heat range");
        assert_eq!(heat.get(Dimension::Temperature), Some(&Bounds::point(26.0)));

        let fluorescence = a
            .working_range(Function::MeasureFluorescence)
            .expect("fluorescence range");
        assert_eq!(fluorescence.get(Dimension::Excitation), Some(&Bounds::point(650.0)));
        assert_eq!(fluorescence.get(Dimension::Emission), Some(&Bounds::point(680.0)));
    }

    #[test]
    fn test_working_ranges_widen_across_uses() {
        let statements = vec![
            Statement::operation(Operation::Stir {
                container: "A".to_string(),
                speed: 20.0,
                timing: Timing::now(1.0),
            }),
            Statement::operation(Operation::Stir {
                container: "A".to_string(),
                speed: 80.0,
                timing: Timing::now(1.0),
            }),
        ];
        let report = analyse(&statements);
        let stir = report
            .container("A")
            .and_then(|a| a.working_range(Function::Stir))
            .expect("stir range");

        assert_eq!(stir.get(Dimension::Frequency), Some(&Bounds::new(20.0, 80.0)));
    }

    #[test]
    fn test_turbidostat_cell() {
        let report = analyse(&turbidostat());
        let cell = report.container("cell").expect("cell is used");

        assert_eq!(cell.connections(), 2);
        assert_eq!(cell.functions().to_string(), "0000000010000");
        assert_eq!(cell.class(), ContainerClass::Closed);

        let media = report.container("media").expect("media is used");
        assert_eq!(media.class(), ContainerClass::Open);
        assert_eq!(media.functions().to_string(), "0000000000000");
    }

    #[test]
    fn test_poison_adds_a_connection() {
        let report = analyse(&turbidostat_with_poison());
        assert_eq!(report.container("cell").map(|c| c.connections()), Some(3));
        assert_eq!(report.container("waste").map(|c| c.connections()), Some(1));
    }

    #[test]
    fn test_requirements_from_executor_events() {
        let direct = turbidostat_requirements();
        let simulated = analyse(&turbidostat());

        assert_eq!(direct.schedule, simulated.schedule);
        assert_eq!(
            direct.container("cell").map(|c| c.functions()),
            simulated.container("cell").map(|c| c.functions())
        );
    }

    #[test]
    fn test_container_display() {
        let report = analyse(&turbidostat());
        let cell = report.container("cell").expect("cell is used");

        assert_eq!(
            cell.to_string(),
            "name: cell;connections: 2;functions: 0000000010000;class: Closed;working ranges[measure_od:Wavelength:[650 nm, 650 nm],]"
        );
    }
}
