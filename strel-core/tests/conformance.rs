use std::error::Error;

use approx::assert_relative_eq;
use strel_core::domains::{BooleanDomain, IntervalDomain, RobustnessDomain, RobustnessInterval};
use strel_core::{evaluate, Bindings, Formula, Interval, Monitor, Signal, TemporalMonitor};

const EPSILON: f64 = 1.0e-9;

type TestResult = Result<(), Box<dyn Error>>;

fn value_bindings() -> Bindings<f64, f64> {
    Bindings::new()
        .with_atom("value", |x: &f64| *x)
        .with_atom("true", |_: &f64| f64::INFINITY)
        .with_atom("high", |x: &f64| x - 3.0)
        .with_atom("time_9", |t: &f64| t - 9.0)
}

#[test]
fn case01() -> TestResult {
    let signal = Signal::from_samples([(0.0, 1.0), (5.0, 1.0)], 10.0)?;
    let phi = Formula::globally_within(Interval::new(0.0, 5.0)?, Formula::atomic("value"));
    let monitor = TemporalMonitor::new(&phi, &value_bindings(), RobustnessDomain)?;
    let rho = monitor.monitor(&signal)?;

    assert_eq!(rho, Signal::constant(0.0, 5.0, 1.0)?);
    Ok(())
}

#[test]
fn case02() -> TestResult {
    let samples = (0..10).map(|t| (f64::from(t), t % 2 == 0));
    let signal = Signal::from_samples(samples, 10.0)?;
    let bindings = Bindings::new().with_atom("p", |p: &bool| *p);
    let phi = Formula::eventually_within(Interval::new(0.0, 2.0)?, Formula::atomic("p"));
    let monitor = TemporalMonitor::new(&phi, &bindings, BooleanDomain)?;
    let verdict = monitor.monitor(&signal)?;

    // Every window of length 2 that fits inside [0, 10] contains a true segment
    assert_eq!(verdict, Signal::constant(0.0, 8.0, true)?);
    Ok(())
}

#[test]
fn case03() -> TestResult {
    let ramp = Signal::from_samples((0..=10).map(|t| (f64::from(t), f64::from(t))), 10.0)?;
    let phi = Formula::until_within(Interval::new(0.0, 5.0)?, Formula::atomic("true"), Formula::atomic("time_9"));
    let monitor = TemporalMonitor::new(&phi, &value_bindings(), RobustnessDomain)?;
    let rho = monitor.monitor(&ramp)?;
    let expected = Signal::from_samples((0..=5).map(|t| (f64::from(t), f64::from(t) - 4.0)), 5.0)?;

    assert_eq!(rho, expected);
    assert_relative_eq!(evaluate(&ramp, &monitor)?, -4.0, epsilon = EPSILON);
    Ok(())
}

#[test]
fn case04() -> TestResult {
    let signal = Signal::from([(0, 0.0), (1, 2.0), (2, 4.0), (3, 1.0), (4, 3.0), (5, 3.0)]);
    let phi = Formula::once_within(Interval::new(1.0, 2.0)?, Formula::atomic("high"));
    let monitor = TemporalMonitor::new(&phi, &value_bindings(), RobustnessDomain)?;
    let rho = monitor.monitor(&signal)?;

    assert_eq!(rho, Signal::from([(2, -1.0), (3, 1.0), (5, 0.0)]));
    assert_relative_eq!(evaluate(&signal, &monitor)?, -1.0, epsilon = EPSILON);
    Ok(())
}

#[test]
fn case05() -> TestResult {
    let signal = Signal::from([(0, 0.0), (1, 2.0), (2, 4.0), (3, 1.0), (4, 3.0), (5, 3.0)]);
    let phi = Formula::not(Formula::eventually(Formula::atomic("high")));
    let dual = Formula::globally(Formula::not(Formula::atomic("high")));
    let bindings = value_bindings();

    let rho = evaluate(&signal, TemporalMonitor::new(&phi, &bindings, RobustnessDomain)?)?;
    let rho_dual = evaluate(&signal, TemporalMonitor::new(&dual, &bindings, RobustnessDomain)?)?;

    assert_relative_eq!(rho, -1.0, epsilon = EPSILON);
    assert_relative_eq!(rho, rho_dual, epsilon = EPSILON);
    Ok(())
}

#[test]
fn case06() -> TestResult {
    let signal = Signal::from([(0.0, 3.0), (0.5, 2.5), (1.5, 4.0), (2.0, 4.0)]);
    let bindings = Bindings::new().with_atom("below_5", |x: &f64| RobustnessInterval::new(4.8 - x, 5.2 - x));
    let phi = Formula::historically(Formula::atomic("below_5"));
    let monitor = TemporalMonitor::new(&phi, &bindings, IntervalDomain)?;
    let rho = monitor.monitor(&signal)?;
    let last = rho.value_at(2.0).copied().ok_or("empty result")?;

    assert_relative_eq!(last.lower, 0.8, epsilon = EPSILON);
    assert_relative_eq!(last.upper, 1.2, epsilon = EPSILON);
    assert!(last.contains(1.0));
    Ok(())
}

#[test]
fn case07() -> TestResult {
    let bindings = Bindings::new()
        .with_atom("request", |state: &(bool, bool)| state.0)
        .with_atom("grant", |state: &(bool, bool)| state.1);

    let phi = Formula::globally(Formula::implies(
        Formula::atomic("grant"),
        Formula::since(Formula::not(Formula::atomic("grant")), Formula::atomic("request")),
    ));

    let monitor = TemporalMonitor::new(&phi, &bindings, BooleanDomain)?;
    let signal = Signal::from([
        (0, (false, false)),
        (1, (true, false)),
        (2, (false, false)),
        (3, (false, true)),
        (4, (false, false)),
    ]);
    let verdict = monitor.monitor(&signal)?;

    // The grant at 3 is preceded by the request at 1, but the grant itself interrupts the since
    assert_eq!(verdict.value_at(0.0), Some(&false));
    Ok(())
}
