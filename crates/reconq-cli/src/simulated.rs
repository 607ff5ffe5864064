//! Simulated reconstruction backend and product repository for the demo.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reconq_core::{ComputeError, ReconstructOutput, Reconstructor, TargetEntity};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub object: Vec<f64>,
    pub costs: Vec<f64>,
}

impl Product {
    pub fn initial(name: String, pixels: usize) -> Self {
        Self {
            name,
            object: vec![1.0; pixels],
            costs: Vec::new(),
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

/// Snapshot handed to the worker.
#[derive(Debug, Clone)]
pub struct ReconstructInput {
    pub object: Vec<f64>,
    pub seed: u64,
}

/// Fake iterative solver: shrinks the object towards zero, records a decreasing
/// cost per iteration, and fails at random.
pub struct SimulatedReconstructor {
    pub iterations: usize,
    pub failure_rate: f64,
    pub step: Duration,
}

impl Reconstructor<ReconstructInput, Product> for SimulatedReconstructor {
    fn name(&self) -> &str {
        "simulated/ePIE"
    }

    fn reconstruct(&self, input: ReconstructInput) -> Result<ReconstructOutput<Product>, ComputeError> {
        if input.object.is_empty() {
            return Err(ComputeError::invalid_input("object has no pixels"));
        }
        let mut rng = StdRng::seed_from_u64(input.seed);
        let fail_at = rng
            .gen_bool(self.failure_rate.clamp(0.0, 1.0))
            .then(|| rng.gen_range(0..self.iterations.max(1)));

        let mut object = input.object;
        let mut costs = Vec::with_capacity(self.iterations);
        for k in 0..self.iterations {
            if fail_at == Some(k) {
                return Err(ComputeError::failed(format!("cost diverged at iteration {k}")));
            }
            thread::sleep(self.step);
            for x in object.iter_mut() {
                *x *= 0.9 + rng.gen_range(-0.01..0.01);
            }
            costs.push(object.iter().map(|x| x * x).sum::<f64>().sqrt());
        }

        let product = Product {
            name: String::new(),
            object,
            costs,
        };
        Ok(ReconstructOutput::ok(product))
    }
}
