use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use rstest::rstest;

use reconq_core::domain::OutcomeKind;
use reconq_core::impls::SequentialIdGenerator;
use reconq_core::ports::FixedClock;
use reconq_core::{
    ComputeError, ExecutionQueue, Job, QueueBuilder, QueueState, ReconstructOutput,
    Reconstructor, ReconstructorRegistry, TargetEntity,
};

#[derive(Debug, Clone, PartialEq)]
struct Product {
    name: String,
    object: Vec<f64>,
    costs: Vec<f64>,
}

impl Product {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            object: vec![1.0, 2.0, 3.0],
            costs: Vec::new(),
        }
    }

    /// What a reconstructor returns: no name.
    fn result(object: Vec<f64>, costs: Vec<f64>) -> Self {
        Self {
            name: String::new(),
            object,
            costs,
        }
    }
}

impl TargetEntity<Product> for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn assign(&mut self, state: Product) {
        *self = state;
    }
}

fn queue() -> ExecutionQueue<usize, Product> {
    QueueBuilder::new()
        .poll_interval(Duration::from_millis(20))
        .clock(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()))
        .id_generator(SequentialIdGenerator::new())
        .build()
        .unwrap()
}

fn repository(n: usize) -> Vec<Product> {
    (0..n).map(|i| Product::named(&format!("scan {i}"))).collect()
}

fn succeed_after(target: usize, delay: Duration, value: f64) -> Job<usize, Product> {
    Job::new(format!("job {target}"), target, move || {
        thread::sleep(delay);
        Ok(ReconstructOutput::ok(Product::result(vec![value], vec![0.5])))
    })
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(25)]
fn completion_order_equals_submission_order(#[case] n: usize) {
    let mut queue = queue();
    let mut products = repository(n);
    queue.start().unwrap();

    // later jobs are faster; order must still follow submission
    let mut submitted = Vec::new();
    for i in 0..n {
        let delay = Duration::from_millis(((n - i) % 5) as u64 * 3);
        submitted.push(queue.submit(succeed_after(i, delay, i as f64)).unwrap());
    }

    let mut drained = Vec::new();
    while drained.len() < n {
        drained.extend(queue.drain_completed(&mut products, true).unwrap());
    }
    queue.stop(&mut products).unwrap();

    let drained_ids: Vec<_> = drained.iter().map(|r| r.job_id).collect();
    assert_eq!(drained_ids, submitted);
    for (i, product) in products.iter().enumerate() {
        assert_eq!(product.object, vec![i as f64]);
    }
}

#[test]
fn mixed_success_and_failure_scenario() {
    let mut queue = queue();
    let mut products = repository(3);
    let original_b = products[1].clone();
    queue.start().unwrap();

    queue
        .submit(Job::new("A", 0, || {
            Ok(ReconstructOutput::ok(Product::result(vec![10.0], vec![3.0, 2.0])))
        }))
        .unwrap();
    queue
        .submit(Job::new("B", 1, || Err(ComputeError::failed("probe diverged"))))
        .unwrap();
    queue
        .submit(Job::new("C", 2, || {
            Ok(ReconstructOutput::ok(Product::result(vec![30.0], vec![1.0])))
        }))
        .unwrap();

    let reports = queue.stop(&mut products).unwrap();

    assert_eq!(products[0].name, "scan 0");
    assert_eq!(products[0].object, vec![10.0]);
    assert_eq!(products[0].costs, vec![3.0, 2.0]);
    assert_eq!(products[1], original_b);
    assert_eq!(products[2].name, "scan 2");
    assert_eq!(products[2].object, vec![30.0]);
    assert!(!queue.is_busy());
    assert_eq!(queue.pending_follow_ups(), 0);
    assert_eq!(queue.state(), QueueState::Stopped);

    let kinds: Vec<_> = reports.iter().map(|r| r.outcome.kind).collect();
    assert_eq!(
        kinds,
        vec![OutcomeKind::Succeeded, OutcomeKind::Failed, OutcomeKind::Succeeded]
    );
    assert_eq!(reports.iter().filter(|r| r.applied).count(), 2);
}

#[test]
fn panicking_job_does_not_stop_the_worker() {
    let mut queue = queue();
    let mut products = repository(2);
    let original = products[0].clone();
    queue.start().unwrap();

    queue
        .submit(Job::new("explodes", 0, || -> Result<ReconstructOutput<Product>, ComputeError> {
            panic!("out of device memory")
        }))
        .unwrap();
    queue
        .submit(succeed_after(1, Duration::ZERO, 7.0))
        .unwrap();

    let reports = queue.stop(&mut products).unwrap();

    assert_eq!(products[0], original);
    assert_eq!(products[1].object, vec![7.0]);
    assert_eq!(reports[0].outcome.kind, OutcomeKind::Panicked);
    assert!(reports[0].outcome.reason.as_deref().unwrap().contains("out of device memory"));
    assert_eq!(queue.status().failed, 1);
    assert_eq!(queue.status().succeeded, 1);
}

#[test]
fn stop_waits_for_every_submitted_job() {
    let mut queue = queue();
    let mut products = repository(4);
    queue.start().unwrap();

    for i in 0..4 {
        queue
            .submit(succeed_after(i, Duration::from_millis(30), 100.0 + i as f64))
            .unwrap();
    }
    assert!(queue.is_busy());

    let reports = queue.stop(&mut products).unwrap();

    assert_eq!(reports.len(), 4);
    assert!(products.iter().all(|p| p.object[0] >= 100.0));
    assert!(products.iter().enumerate().all(|(i, p)| p.name == format!("scan {i}")));
    assert!(!queue.is_busy());
    assert_eq!(queue.pending_follow_ups(), 0);
    assert_eq!(queue.queued_len(), 0);
}

#[test]
fn non_blocking_drain_on_empty_queue_returns_immediately() {
    let mut queue = queue();
    let mut products = repository(1);
    let before = products.clone();
    queue.start().unwrap();

    let tic = Instant::now();
    let reports = queue.drain_completed(&mut products, false).unwrap();

    assert!(reports.is_empty());
    assert!(tic.elapsed() < Duration::from_millis(100));
    assert_eq!(products, before);
    queue.stop(&mut products).unwrap();
}

#[test]
fn non_blocking_drain_does_not_wait_for_running_job() {
    let mut queue = queue();
    let mut products = repository(1);
    queue.start().unwrap();
    queue
        .submit(succeed_after(0, Duration::from_millis(300), 1.0))
        .unwrap();

    let tic = Instant::now();
    let reports = queue.drain_completed(&mut products, false).unwrap();
    assert!(reports.is_empty());
    assert!(tic.elapsed() < Duration::from_millis(200));
    assert!(queue.is_busy());

    let reports = queue.drain_completed(&mut products, true).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(products[0].object, vec![1.0]);
    queue.stop(&mut products).unwrap();
}

struct Epie {
    iterations: usize,
}

impl Reconstructor<Vec<f64>, Product> for Epie {
    fn name(&self) -> &str {
        "pty-chi/ePIE"
    }

    fn reconstruct(&self, object: Vec<f64>) -> Result<ReconstructOutput<Product>, ComputeError> {
        if object.is_empty() {
            return Err(ComputeError::invalid_input("object has no pixels"));
        }
        let costs = (0..self.iterations).map(|k| 1.0 / (k + 1) as f64).collect();
        let object = object.iter().map(|x| x * 0.5).collect();
        Ok(ReconstructOutput::new(Product::result(object, costs), 0))
    }
}

#[test]
fn registered_reconstructor_runs_on_snapshot() {
    let mut registry: ReconstructorRegistry<Vec<f64>, Product> = ReconstructorRegistry::new();
    registry.register(Arc::new(Epie { iterations: 3 })).unwrap();

    let mut queue = queue();
    let mut products = repository(2);
    queue.start().unwrap();

    let epie = registry.get("pty-chi/ePIE").unwrap();
    let snapshot = products[0].object.clone();
    queue
        .submit(Job::from_reconstructor(Arc::clone(&epie), snapshot, 0))
        .unwrap();
    queue
        .submit(Job::from_reconstructor(epie, Vec::new(), 1))
        .unwrap();

    // the live product can change while the job runs; the job saw the snapshot
    products[0].name = "renamed while running".to_string();

    let reports = queue.stop(&mut products).unwrap();

    assert_eq!(products[0].object, vec![0.5, 1.0, 1.5]);
    assert_eq!(products[0].costs.len(), 3);
    assert_eq!(products[0].name, "renamed while running");
    assert_eq!(products[1], Product::named("scan 1"));
    assert_eq!(reports[0].label, "pty-chi/ePIE");
    assert_eq!(reports[1].outcome.kind, OutcomeKind::Failed);
}

#[test]
fn reports_serialize_for_display() {
    let mut queue = queue();
    let mut products = repository(1);
    queue.start().unwrap();
    queue.submit(succeed_after(0, Duration::ZERO, 2.0)).unwrap();

    let reports = queue.stop(&mut products).unwrap();
    let v = serde_json::to_value(&reports).unwrap();

    assert_eq!(v[0]["job_id"], SequentialIdGenerator::id_for(1).as_ulid().to_string());
    assert_eq!(v[0]["outcome"]["kind"], "SUCCEEDED");
    assert_eq!(v[0]["applied"], true);
    assert_eq!(v[0]["submitted_at"], "2024-03-01T09:00:00Z");
}
