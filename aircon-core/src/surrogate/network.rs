//! Cell/synapse graph of a three-layer feed-forward network.
//!
//! Cells and synapses live in flat arenas and refer to each other by index.
//! Input cells have no incoming synapses and zero bias; output cells have no
//! outgoing synapses.

use crate::core::error::{AirconError, Result};
use rand::Rng;
use std::ops::Range;

/// Activations are clamped to this magnitude before `exp`.
const ACTIVATION_LIMIT: f32 = 500.0;

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    let x = x.clamp(-ACTIVATION_LIMIT, ACTIVATION_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

#[derive(Clone, Debug)]
pub struct NeuralCell {
    pub bias: f32,
    pub output: f32,
    /// Error gradient from the last backward pass
    pub error: f32,
    incoming: Vec<usize>,
    outgoing: Vec<usize>,
}

impl NeuralCell {
    fn new(bias: f32) -> Self {
        NeuralCell {
            bias,
            output: 0.0,
            error: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn incoming(&self) -> &[usize] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[usize] {
        &self.outgoing
    }
}

#[derive(Clone, Debug)]
pub struct Synapse {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

#[derive(Clone, Debug)]
pub struct NeuralGraph {
    cells: Vec<NeuralCell>,
    synapses: Vec<Synapse>,
    input: Range<usize>,
    hidden: Range<usize>,
    output: Range<usize>,
}

impl NeuralGraph {
    /// Fully connects input to hidden and hidden to output.
    ///
    /// Weights are drawn from `[-weight_init, weight_init]`, hidden and
    /// output biases from `[-bias_init, bias_init]`.
    pub fn new<R: Rng + ?Sized>(
        input_count: usize,
        hidden_count: usize,
        output_count: usize,
        weight_init: f32,
        bias_init: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if input_count == 0 || hidden_count == 0 || output_count == 0 {
            return Err(AirconError::config(format!(
                "network layers must be non-empty ({}/{}/{})",
                input_count, hidden_count, output_count
            )));
        }
        let usable = |bound: f32| bound >= 0.0 && bound.is_finite();
        if !usable(weight_init) || !usable(bias_init) {
            return Err(AirconError::config("initialisation bounds must be finite and non-negative"));
        }

        let input = 0..input_count;
        let hidden = input.end..input.end + hidden_count;
        let output = hidden.end..hidden.end + output_count;

        let mut cells = Vec::with_capacity(output.end);
        cells.extend(input.clone().map(|_| NeuralCell::new(0.0)));
        for _ in input.end..output.end {
            cells.push(NeuralCell::new(rng.gen_range(-bias_init..=bias_init)));
        }

        let mut graph = NeuralGraph {
            cells,
            synapses: Vec::with_capacity(input_count * hidden_count + hidden_count * output_count),
            input,
            hidden,
            output,
        };
        for (from, to) in [
            (graph.input.clone(), graph.hidden.clone()),
            (graph.hidden.clone(), graph.output.clone()),
        ] {
            for source in from {
                for target in to.clone() {
                    graph.connect(source, target, rng.gen_range(-weight_init..=weight_init));
                }
            }
        }
        Ok(graph)
    }

    fn connect(&mut self, source: usize, target: usize, weight: f32) {
        let idx = self.synapses.len();
        self.synapses.push(Synapse {
            source,
            target,
            weight,
        });
        self.cells[source].outgoing.push(idx);
        self.cells[target].incoming.push(idx);
    }

    pub fn input_count(&self) -> usize {
        self.input.len()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn output_count(&self) -> usize {
        self.output.len()
    }

    pub fn cells(&self) -> &[NeuralCell] {
        &self.cells
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    fn activation(&self, cell: usize, outputs: &[f32]) -> f32 {
        let c = &self.cells[cell];
        let sum: f32 = c
            .incoming
            .iter()
            .map(|&s| {
                let syn = &self.synapses[s];
                syn.weight * outputs[syn.source]
            })
            .sum();
        sigmoid(sum + c.bias)
    }

    /// Forward pass that stores every cell's output in the graph.
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<()> {
        AirconError::check_len(self.input_count(), inputs.len())?;
        let mut outputs: Vec<f32> = self.cells.iter().map(|c| c.output).collect();
        self.forward_into(inputs, &mut outputs);
        for (cell, out) in self.cells.iter_mut().zip(outputs) {
            cell.output = out;
        }
        Ok(())
    }

    /// Forward pass into a caller-owned buffer; the graph is untouched.
    pub fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        AirconError::check_len(self.input_count(), inputs.len())?;
        let mut outputs = vec![0.0; self.cells.len()];
        self.forward_into(inputs, &mut outputs);
        Ok(outputs[self.output.clone()].to_vec())
    }

    fn forward_into(&self, inputs: &[f32], outputs: &mut [f32]) {
        outputs[self.input.clone()].copy_from_slice(inputs);
        for cell in self.hidden.clone().chain(self.output.clone()) {
            let value = self.activation(cell, outputs);
            outputs[cell] = value;
        }
    }

    pub fn outputs(&self) -> Vec<f32> {
        self.cells[self.output.clone()]
            .iter()
            .map(|c| c.output)
            .collect()
    }

    /// Computes error gradients for the output and hidden layers.
    pub fn back_propagate(&mut self, targets: &[f32]) -> Result<()> {
        AirconError::check_len(self.output_count(), targets.len())?;
        for (cell, &target) in self.output.clone().zip(targets) {
            let c = &mut self.cells[cell];
            c.error = c.output * (1.0 - c.output) * (target - c.output);
        }
        for cell in self.hidden.clone() {
            let downstream: f32 = self.cells[cell]
                .outgoing
                .iter()
                .map(|&s| {
                    let syn = &self.synapses[s];
                    syn.weight * self.cells[syn.target].error
                })
                .sum();
            let c = &mut self.cells[cell];
            c.error = c.output * (1.0 - c.output) * downstream;
        }
        Ok(())
    }

    /// Gradient step using the errors from the last backward pass.
    pub fn adjust(&mut self, learning_rate: f32) {
        for syn in self.synapses.iter_mut() {
            syn.weight += learning_rate * self.cells[syn.source].output * self.cells[syn.target].error;
        }
        for cell in self.hidden.start..self.output.end {
            let c = &mut self.cells[cell];
            c.bias += learning_rate * c.error;
        }
    }
}
