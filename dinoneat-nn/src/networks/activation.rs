use crate::genomics::ActivationType;

/// Applies the activation function to a node's input sum.
pub fn compute_activation(input_sum: f32, activation_function: ActivationType) -> f32 {
    match activation_function {
        ActivationType::Sigmoid => 1.0 / (1.0 + (-4.9 * input_sum).exp()),
        ActivationType::Tanh => input_sum.tanh(),
        ActivationType::Identity => input_sum,
        ActivationType::ReLU => input_sum.max(0.0),
        ActivationType::Gaussian => (-input_sum.powi(2)).exp(),
        ActivationType::Sinusoidal => (input_sum * std::f32::consts::PI).sin(),
    }
}

/// Normalizes `values` into a probability distribution.
///
/// # Examples
/// ```
/// use dinoneat_nn::networks::softmax;
///
/// let p = softmax(&[1.0, 1.0, 1.0, 1.0]);
/// assert!(p.iter().all(|x| (x - 0.25).abs() < 1e-6));
///
/// assert!(softmax(&[]).is_empty());
/// ```
pub fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Returns the index of the largest value, the first on ties,
/// or `None` if `values` is empty or all NaN.
///
/// # Examples
/// ```
/// use dinoneat_nn::networks::argmax;
///
/// assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
/// assert_eq!(argmax(&[]), None);
/// ```
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, v)| match best {
            Some((_, b)) if b >= *v => best,
            _ => Some((i, *v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activations() {
        assert_eq!(compute_activation(0.0, ActivationType::Sigmoid), 0.5);
        assert_eq!(compute_activation(-2.0, ActivationType::ReLU), 0.0);
        assert_eq!(compute_activation(2.0, ActivationType::ReLU), 2.0);
        assert_eq!(compute_activation(0.0, ActivationType::Gaussian), 1.0);
        assert_eq!(compute_activation(-1.5, ActivationType::Identity), -1.5);
        assert!(compute_activation(0.5, ActivationType::Tanh) > 0.46);
        assert!(compute_activation(1.0, ActivationType::Sinusoidal).abs() < 1e-6);
    }

    #[test]
    fn softmax_is_stable_for_large_inputs() {
        let p = softmax(&[1000.0, 0.0]);
        assert!((p[0] - 1.0).abs() < 1e-6);
        assert!(p.iter().all(|x| x.is_finite()));
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn argmax_preserved_by_softmax() {
        let outputs = [0.3, -1.2, 0.9];
        assert_eq!(argmax(&outputs), argmax(&softmax(&outputs)));
        assert_eq!(argmax(&[f32::NAN, 0.5]), Some(1));
    }
}
