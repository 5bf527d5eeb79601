use nlopt::Algorithm;
use nlopt::Nlopt;
use nlopt::Target;

/// terminal state of a solve: the final iterate, its objective value,
/// and the solver status (positive on success, negative on failure)
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub x: Vec<f64>,
    pub objective: f64,
    pub status: i32,
}

/// minimize a smooth objective over a box with SLSQP.
///
/// the objective sees only the iterate; gradients the solver asks for
/// are filled in by central differences around it. infinite bounds are
/// fine, and iterates stay inside the box throughout.
pub fn slsqp<F>(objective: F, x0: &[f64], lower: &[f64], upper: &[f64], ftol: f64) -> Outcome
where
    F: Fn(&[f64]) -> f64,
{
    let mut x = x0.to_vec();
    let mut solver = Nlopt::new(
        Algorithm::Slsqp,
        x.len(),
        evaluate::<F>,
        Target::Minimize,
        objective,
    );
    solver.set_lower_bounds(lower).expect("lower bounds");
    solver.set_upper_bounds(upper).expect("upper bounds");
    solver.set_ftol_rel(ftol).expect("relative tolerance");
    solver.set_maxeval(crate::MAX_EVALUATIONS).expect("evaluation budget");
    match solver.optimize(&mut x) {
        Ok((state, objective)) => Outcome { x, objective, status: success(state as i32) },
        Err((state, objective)) => Outcome { x, objective, status: failure(state as i32) },
    }
}

fn evaluate<F>(x: &[f64], gradient: Option<&mut [f64]>, objective: &mut F) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    if let Some(gradient) = gradient {
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            let dx = f64::EPSILON.sqrt() * x[i].abs().max(1.);
            probe[i] = x[i] + dx;
            let hi = objective(&probe);
            probe[i] = x[i] - dx;
            let lo = objective(&probe);
            probe[i] = x[i];
            gradient[i] = (hi - lo) / (2. * dx);
        }
    }
    objective(x)
}

/// success codes are positive, failure codes negative, never zero
fn success(code: i32) -> i32 {
    code.abs().max(1)
}

fn failure(code: i32) -> i32 {
    -code.abs().max(1)
}
