use std::fmt::Write;
use std::thread;
use std::time::Duration;

use cpucheck::check::{Check, CpuCheck, resolve_check};
use cpucheck::error::CounterUnavailable;
use cpucheck::sender::{Gauge, RecordingSender};
use cpucheck::system::CpuTimes;
use cpucheck::system::fake::FakeHost;

const CATEGORY_METRICS: [&str; 6] = [
    "system.cpu.user",
    "system.cpu.system",
    "system.cpu.iowait",
    "system.cpu.idle",
    "system.cpu.stolen",
    "system.cpu.guest",
];

fn times(user: f64, system: f64, idle: f64) -> CpuTimes {
    CpuTimes {
        user,
        system,
        idle,
        ..CpuTimes::default()
    }
}

fn render(batches: &[Vec<Gauge>]) -> String {
    let mut out = String::new();
    for (i, batch) in batches.iter().enumerate() {
        if batch.is_empty() {
            let _ = writeln!(out, "{i} <empty>");
        }
        for gauge in batch {
            let _ = writeln!(out, "{i} {} {:.2}", gauge.name, gauge.value);
        }
    }
    out
}

#[test]
fn three_cycles_through_the_check_lifecycle() {
    let host = FakeHost::new(
        4,
        vec![
            Ok(times(100.0, 50.0, 850.0)),
            Ok(times(140.0, 70.0, 990.0)),
            Ok(times(140.0, 70.0, 990.0)),
        ],
    )
    .with_interrupt(vec![
        Ok(1.25),
        Err(CounterUnavailable::new("% Interrupt Time", "collect failed")),
        Ok(0.75),
    ]);
    let mut check = CpuCheck::with_host(host);
    let mut sender = RecordingSender::new();

    check.configure(&toml::Table::new()).unwrap();
    for _ in 0..3 {
        check.run(&mut sender).unwrap();
    }

    insta::assert_snapshot!(render(sender.batches()), @r"
    0 system.cpu.interrupt 1.25
    1 system.cpu.user 20.00
    1 system.cpu.system 10.00
    1 system.cpu.iowait 0.00
    1 system.cpu.idle 70.00
    1 system.cpu.stolen 0.00
    1 system.cpu.guest 0.00
    2 system.cpu.interrupt 0.75
    ");
}

#[test]
fn empty_cycle_still_commits() {
    let host = FakeHost::new(2, vec![Ok(times(1.0, 1.0, 8.0))]);
    let mut check = CpuCheck::with_host(host);
    let mut sender = RecordingSender::new();

    check.configure(&toml::Table::new()).unwrap();
    check.run(&mut sender).unwrap();

    insta::assert_snapshot!(render(sender.batches()), @"0 <empty>");
}

#[test]
#[cfg_attr(
    not(any(target_os = "linux", target_os = "macos", target_os = "windows")),
    ignore = "no cpu time source on this platform"
)]
fn registered_cpu_check_runs_on_this_host() {
    let mut check = resolve_check("cpu").expect("cpu check is registered");
    check
        .configure(&toml::Table::new())
        .expect("configure reads the host cpu count");

    let mut sender = RecordingSender::new();
    check.run(&mut sender).expect("first run samples the host");
    let first = sender.last_batch().unwrap();
    assert!(
        first
            .iter()
            .all(|g| !CATEGORY_METRICS.contains(&g.name.as_str()))
    );

    thread::sleep(Duration::from_millis(250));
    check.run(&mut sender).expect("second run samples the host");

    let second = sender.last_batch().unwrap();
    let categories: Vec<&Gauge> = second
        .iter()
        .filter(|g| CATEGORY_METRICS.contains(&g.name.as_str()))
        .collect();
    assert_eq!(categories.len(), 6, "second run reports every category");
    for gauge in categories {
        assert!(
            gauge.value.is_finite() && gauge.value >= 0.0,
            "{} was {}",
            gauge.name,
            gauge.value
        );
    }
}
