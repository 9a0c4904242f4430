//! CLI driver mirroring the original `run_neat.py --task` dispatch: picks a
//! task's hyperparameters and fitness function, then runs NEAT on it.
//!
//! ```text
//! cargo run --bin run_neat -- --task xor
//! ```

use std::env;
use std::process;

use neat::{Config, FeedforwardNetwork, Genome};
use tracing_subscriber::EnvFilter;

const XOR_INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const XOR_OUTPUTS: [f64; 4] = [0.0, 1.0, 1.0, 0.0];

fn xor_fitness(genome: &Genome) -> f64 {
    let network = FeedforwardNetwork::new(genome);
    let mut fitness = 4.0;
    for (xi, xo) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = network.forward(xi).expect("genome input size matches XOR arity");
        fitness -= (output[0] - xo).powi(2);
    }
    fitness
}

const CARTPOLE_DT: f64 = 0.02;
const CARTPOLE_GRAVITY: f64 = 9.8;
const CARTPOLE_MASS_CART: f64 = 1.0;
const CARTPOLE_MASS_POLE: f64 = 0.1;
const CARTPOLE_POLE_HALF_LENGTH: f64 = 0.5;
const CARTPOLE_FORCE_MAG: f64 = 10.0;
const CARTPOLE_MAX_STEPS: usize = 500;
const CARTPOLE_X_LIMIT: f64 = 2.4;
const CARTPOLE_THETA_LIMIT: f64 = 0.20944;

/// Classic cartpole dynamics, integrated with a fixed-step Euler scheme
/// since no gym binding exists in this stack.
fn cartpole_fitness(genome: &Genome) -> f64 {
    let network = FeedforwardNetwork::new(genome);

    let (mut x, mut x_dot, mut theta, mut theta_dot) = (0.0, 0.0, 0.05, 0.0);
    let mut steps = 0usize;

    for _ in 0..CARTPOLE_MAX_STEPS {
        let output = network
            .forward(&[x, x_dot, theta, theta_dot])
            .expect("genome input size matches cartpole state arity");
        let force = if output[0] > 0.5 {
            CARTPOLE_FORCE_MAG
        } else {
            -CARTPOLE_FORCE_MAG
        };

        let costheta = theta.cos();
        let sintheta = theta.sin();
        let temp = (force + CARTPOLE_MASS_POLE * CARTPOLE_POLE_HALF_LENGTH * theta_dot.powi(2) * sintheta)
            / (CARTPOLE_MASS_CART + CARTPOLE_MASS_POLE);
        let theta_acc = (CARTPOLE_GRAVITY * sintheta - costheta * temp)
            / (CARTPOLE_POLE_HALF_LENGTH
                * (4.0 / 3.0 - CARTPOLE_MASS_POLE * costheta.powi(2) / (CARTPOLE_MASS_CART + CARTPOLE_MASS_POLE)));
        let x_acc = temp
            - CARTPOLE_MASS_POLE * CARTPOLE_POLE_HALF_LENGTH * theta_acc * costheta
                / (CARTPOLE_MASS_CART + CARTPOLE_MASS_POLE);

        x += CARTPOLE_DT * x_dot;
        x_dot += CARTPOLE_DT * x_acc;
        theta += CARTPOLE_DT * theta_dot;
        theta_dot += CARTPOLE_DT * theta_acc;
        steps += 1;

        if x.abs() > CARTPOLE_X_LIMIT || theta.abs() > CARTPOLE_THETA_LIMIT {
            break;
        }
    }

    steps as f64
}

const LUNAR_DT: f64 = 1.0 / 50.0;
const LUNAR_GRAVITY: f64 = -1.62; // lunar surface gravity
const LUNAR_MAIN_ENGINE_POWER: f64 = 13.0;
const LUNAR_SIDE_ENGINE_POWER: f64 = 0.6;
const LUNAR_MAX_STEPS: usize = 1000;
const LUNAR_PAD_HALF_WIDTH: f64 = 1.0;
const LUNAR_GROUND_Y: f64 = 0.0;

struct LanderState {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    angle: f64,
    angular_velocity: f64,
}

/// Simplified 2D rigid-body lander simulation in place of a gym binding.
/// State: x, y, x velocity, y velocity, angle, angular velocity, and two
/// leg-contact flags (8 inputs, matching the original environment).
/// Action: argmax over {do nothing, fire left, fire main, fire right}.
fn lunar_fitness(genome: &Genome) -> f64 {
    let network = FeedforwardNetwork::new(genome);

    let mut s = LanderState {
        x: 0.0,
        y: 10.0,
        vx: 0.3,
        vy: 0.0,
        angle: 0.0,
        angular_velocity: 0.0,
    };

    let mut fuel_used = 0.0;
    let mut landed = false;
    let mut crashed = false;
    let mut steps_taken = 0;

    for _ in 0..LUNAR_MAX_STEPS {
        steps_taken += 1;

        let left_leg_contact = if s.y <= LUNAR_GROUND_Y { 1.0 } else { 0.0 };
        let right_leg_contact = left_leg_contact;
        let inputs = [
            s.x,
            s.y,
            s.vx,
            s.vy,
            s.angle,
            s.angular_velocity,
            left_leg_contact,
            right_leg_contact,
        ];
        let output = network
            .forward(&inputs)
            .expect("genome input size matches lander state arity");
        let action = output
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).expect("network output is never NaN"))
            .map(|(i, _)| i)
            .expect("network always has at least one output");

        let (main_thrust, side_thrust) = match action {
            1 => (0.0, -LUNAR_SIDE_ENGINE_POWER),
            2 => (LUNAR_MAIN_ENGINE_POWER, 0.0),
            3 => (0.0, LUNAR_SIDE_ENGINE_POWER),
            _ => (0.0, 0.0),
        };
        fuel_used += main_thrust.abs() + side_thrust.abs();

        let ax = side_thrust * s.angle.cos() - main_thrust * s.angle.sin();
        let ay = LUNAR_GRAVITY + main_thrust * s.angle.cos() + side_thrust * s.angle.sin();

        s.vx += LUNAR_DT * ax;
        s.vy += LUNAR_DT * ay;
        s.x += LUNAR_DT * s.vx;
        s.y += LUNAR_DT * s.vy;
        s.angular_velocity += LUNAR_DT * side_thrust * 0.1;
        s.angle += LUNAR_DT * s.angular_velocity;

        if s.y <= LUNAR_GROUND_Y {
            s.y = LUNAR_GROUND_Y;
            let upright = s.angle.abs() < 0.25;
            let soft = s.vy.abs() < 2.0 && s.vx.abs() < 2.0;
            let on_pad = s.x.abs() < LUNAR_PAD_HALF_WIDTH;
            if upright && soft && on_pad {
                landed = true;
            } else {
                crashed = true;
            }
            break;
        }
    }

    let distance_penalty = (s.x.powi(2) + s.y.powi(2)).sqrt();
    let speed_penalty = (s.vx.powi(2) + s.vy.powi(2)).sqrt();
    let mut fitness = 100.0 - 10.0 * distance_penalty - 5.0 * speed_penalty - 0.01 * fuel_used;
    if landed {
        fitness += 200.0;
    }
    if crashed {
        fitness -= 100.0;
    }
    if !landed && !crashed && steps_taken == LUNAR_MAX_STEPS {
        fitness -= 50.0;
    }
    fitness
}

fn run_xor() {
    let config = Config {
        input_size: 2,
        output_size: 1,
        population_size: 250,
        max_generations: 200,
        stop_threshold: 4.0 - 1e-3,
        ..Config::default()
    };

    let mut rng = neat::rng::entropy_rng();
    let (champion, stats) =
        neat::run(&config, xor_fitness, &mut rng).expect("xor task never exceeds output_size/min_node_count");

    let last = stats.last().expect("run always produces at least one generation");
    println!(
        "xor solved in {} generations (max fitness {:.3})",
        last.generation, last.max_fitness
    );

    let network = FeedforwardNetwork::new(&champion);
    for (xi, xo) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = network.forward(xi).unwrap();
        println!("{xi:?} -> {:.3} (target {xo})", output[0]);
    }
}

fn run_cartpole() {
    let config = Config {
        input_size: 4,
        output_size: 1,
        population_size: 250,
        max_generations: 200,
        stop_threshold: 200.0,
        stop_criterion: neat::config::StopCriterion::Mean,
        ..Config::default()
    };

    let mut rng = neat::rng::entropy_rng();
    let (champion, stats) = neat::run(&config, cartpole_fitness, &mut rng)
        .expect("cartpole task never exceeds output_size/min_node_count");

    let last = stats.last().expect("run always produces at least one generation");
    println!(
        "cartpole solved in {} generations (mean fitness {:.1} steps)",
        last.generation, last.mean_fitness
    );
    println!("champion survived {:.0} steps", cartpole_fitness(&champion));
}

fn run_lunar() {
    let config = Config {
        input_size: 8,
        output_size: 4,
        population_size: 500,
        max_generations: 200,
        stop_threshold: 250.0,
        stop_criterion: neat::config::StopCriterion::Max,
        ..Config::default()
    };

    let mut rng = neat::rng::entropy_rng();
    let (champion, stats) =
        neat::run(&config, lunar_fitness, &mut rng).expect("lunar task never exceeds output_size/min_node_count");

    let last = stats.last().expect("run always produces at least one generation");
    println!(
        "lunar lander solved in {} generations (max fitness {:.1})",
        last.generation, last.max_fitness
    );
    println!("champion fitness on replay: {:.1}", lunar_fitness(&champion));
}

/// Parses `--task <xor|cartpole|lunar>` out of the process arguments,
/// exiting with a descriptive message on anything else.
fn parse_task(mut args: impl Iterator<Item = String>) -> String {
    match args.next() {
        Some(flag) if flag == "--task" => {}
        Some(other) => {
            eprintln!("error: unrecognized argument '{other}', expected --task <xor|cartpole|lunar>");
            process::exit(1);
        }
        None => {
            eprintln!("error: missing required argument --task <xor|cartpole|lunar>");
            process::exit(1);
        }
    }

    match args.next() {
        Some(task) => task,
        None => {
            eprintln!("error: --task requires a value: one of xor, cartpole, lunar");
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let task = parse_task(env::args().skip(1));

    match task.as_str() {
        "xor" => run_xor(),
        "cartpole" => run_cartpole(),
        "lunar" => run_lunar(),
        other => {
            eprintln!("error: unknown task '{other}', expected one of xor, cartpole, lunar");
            process::exit(1);
        }
    }
}
