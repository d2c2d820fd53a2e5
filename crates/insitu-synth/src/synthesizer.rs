//! The [`Synthesizer`] trait.

/// A pure function from `(position, time)` to a scalar sample.
///
/// # Contract
///
/// - `sample()` MUST be deterministic: identical inputs produce
///   bit-identical outputs.
/// - `sample()` takes `&self`: a sample depends only on its own
///   arguments, so the fill routines may evaluate vertices in any order
///   and on any thread.
///
/// # Examples
///
/// ```
/// use insitu_synth::Synthesizer;
///
/// struct Plane;
///
/// impl Synthesizer for Plane {
///     fn name(&self) -> &str { "plane" }
///
///     fn sample(&self, coord: [f64; 3], time: f64) -> f64 {
///         coord[0] + time
///     }
/// }
///
/// assert_eq!(Plane.sample([2.0, 0.0, 0.0], 0.5), 2.5);
/// ```
pub trait Synthesizer: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Field value at physical position `coord` and time `time`.
    fn sample(&self, coord: [f64; 3], time: f64) -> f64;
}

impl<S: Synthesizer + ?Sized> Synthesizer for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sample(&self, coord: [f64; 3], time: f64) -> f64 {
        (**self).sample(coord, time)
    }
}
