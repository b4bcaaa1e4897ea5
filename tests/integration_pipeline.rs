//! End-to-end pipeline tests: raw CSV exports to aggregated energy tables.

mod common;

use therm_audit::clean::power::{clean_power_table, power_used};
use therm_audit::clean::rooms;
use therm_audit::clean::temperature::build_temperature_table;
use therm_audit::energy::{AggregateOptions, CalcMode, ConductionTerms, energy_to_building};
use therm_audit::io::export::write_csv;
use therm_audit::table::RawTable;

const FCU_STH_CSV: &str = "\
Timestamp,FCU-01 ZnTmp Extended Trend Log,OaTmp,OaRH
10/02/2020 06:00:00,21.0,30.0,55.0
10/02/2020 06:05:00,21.0,30.0,55.0
10/02/2020 06:10:00,21.0,30.0,55.0
10/02/2020 06:15:00,21.0,30.0,55.0
10/02/2020 06:20:00,21.0,30.0,55.0
10/02/2020 06:25:00,21.0,30.0,55.0
10/02/2020 06:30:00,21.0,30.0,55.0
";

const FCU_NTH_CSV: &str = "\
Timestamp,FCU-02 ZnTmp - Trend - Extd,FCU-24 ZnTmp Extended Trend Log,OaTmp,OaRH,hour
10/02/2020 06:00:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:05:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:10:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:15:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:20:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:25:00,23.0,24.0,30.2,54.0,6
10/02/2020 06:30:00,23.0,24.0,30.2,54.0,6
";

const AHU_CSV: &str = "\
Timestamp,AHU-B1-01 ZnTmp_1 - Trend - Extd
10/02/2020 06:00:00,19.0
10/02/2020 06:05:00,19.0
10/02/2020 06:10:00,19.0
10/02/2020 06:15:00,19.0
10/02/2020 06:20:00,19.0
10/02/2020 06:25:00,19.0
10/02/2020 06:30:00,19.0
";

const ROOMS_CSV: &str = "\
Room Name,AHU / FCU,Total Area,External Wall Length
Reception,FCU-01,20.0,5.0
Meeting Rm 1,FCU-02,12.5,3.0
Basement Hall,AHU-B1-01,80.0,0.0
";

const POWER_CSV: &str = "\
Timestamp,LTB CH 1 Pwr - Extended Trend Log,LTB  BLR 1 Pwr - Ext
10/02/2020 06:00:00,\"1,000.5\",10
10/02/2020 07:00:00,2.5,0.5
28/02/2020  1:00:00,999,999
";

fn raw(csv: &str) -> RawTable {
    RawTable::from_csv_reader(csv.as_bytes()).expect("well-formed csv")
}

#[test]
fn raw_logs_become_one_normalized_table() {
    let cfg = common::default_config();
    let temps =
        build_temperature_table(raw(FCU_STH_CSV), raw(FCU_NTH_CSV), raw(AHU_CSV), &cfg)
            .expect("temperature table");

    // 5-minute logs resampled to 15 minutes: 06:00, 06:15, 06:30.
    assert_eq!(temps.len(), 3);
    let names = temps.column_names();
    assert!(names.contains(&"FCU-01 ZnTmp"));
    assert!(names.contains(&"FCU-02 ZnTmp"));
    assert!(names.contains(&"FCU-24 ZnTmp"));
    assert!(names.contains(&"AHU-B1-01 ZnTmp_1"));
    assert!(!names.contains(&"hour"));
    assert_eq!(names.iter().filter(|n| **n == "OaTmp").count(), 1);
    // The south log's outdoor reading wins over the north duplicate.
    assert_eq!(
        temps.column("OaTmp").expect("column")[0],
        Some(30.0)
    );
}

#[test]
fn cleaned_table_feeds_the_building_aggregator() {
    let cfg = common::default_config();
    let temps =
        build_temperature_table(raw(FCU_STH_CSV), raw(FCU_NTH_CSV), raw(AHU_CSV), &cfg)
            .expect("temperature table");
    let room_list = rooms::from_csv_reader(ROOMS_CSV.as_bytes()).expect("rooms");

    let building = energy_to_building(
        &temps,
        &room_list,
        &cfg,
        &AggregateOptions {
            mode: CalcMode::Conduction(ConductionTerms::full()),
            ..AggregateOptions::default()
        },
    )
    .expect("building table");

    assert_eq!(
        building.column_names(),
        vec!["Basement Hall", "Meeting Rm 1", "Reception"]
    );
    assert_eq!(building.len(), temps.len());

    // Reception, full terms, 15-minute interval:
    //   external glazing:  2.7 × (5 × 3.3) × (30 − 21) = 400.95 W
    //   internal glazing:  2.7 × (5 × 3.3) × (24 − 21) = 133.65 W
    //   internal concrete: 1.45 × (5 × 3.3) × 2 × (24 − 21) = 143.55 W
    //   (400.95 + 133.65 + 143.55) × 900 / 1000 = 610.335 kJ
    let reception = building.column("Reception").expect("column");
    let first = reception[0].expect("value");
    assert!((first - 610.335).abs() < 1e-9, "got {first}");

    let basement = building.column("Basement Hall").expect("column");
    assert!(basement.iter().all(|kj| *kj == Some(0.0)));
}

#[test]
fn aggregated_table_exports_as_csv() {
    let cfg = common::default_config();
    let temps =
        build_temperature_table(raw(FCU_STH_CSV), raw(FCU_NTH_CSV), raw(AHU_CSV), &cfg)
            .expect("temperature table");
    let room_list = rooms::from_csv_reader(ROOMS_CSV.as_bytes()).expect("rooms");
    let building = energy_to_building(&temps, &room_list, &cfg, &AggregateOptions::default())
        .expect("building table");

    let mut buf = Vec::new();
    write_csv(&building, &mut buf).expect("export");
    let csv = String::from_utf8(buf).expect("utf-8");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Timestamp,Basement Hall,Meeting Rm 1,Reception")
    );
    assert_eq!(lines.count(), building.len());
}

#[test]
fn power_pipeline_sums_by_prefix_in_kilojoules() {
    let cfg = common::default_config();
    let power = clean_power_table(raw(POWER_CSV), &cfg).expect("power table");

    // Full range: the 28/02 01:00 sentinel row contributes nothing.
    let totals = power_used(&power, None, &cfg).expect("totals");
    assert!((totals.chiller_kj - 1003.0 * 3600.0).abs() < 1e-6);
    assert!((totals.boiler_kj - 10.5 * 3600.0).abs() < 1e-6);

    // Half-open subrange keeps only the 06:00 row.
    let range = Some((common::ts(6, 0), common::ts(7, 0)));
    let sub = power_used(&power, range, &cfg).expect("totals");
    assert!((sub.chiller_kj - 1000.5 * 3600.0).abs() < 1e-6);
    assert!((sub.boiler_kj - 10.0 * 3600.0).abs() < 1e-6);

    // Idempotent over the same range.
    assert_eq!(sub, power_used(&power, range, &cfg).expect("totals"));
}
