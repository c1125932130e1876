//! Capabilities a datasource driver exposes to the interpolator.

use crate::config::DriverSettings;
use crate::registry::Macros;
use std::time::Duration;

/// Supplies driver-specific macros.
///
/// Macros returned here are merged over the defaults: a macro with the same name as
/// a default replaces it entirely.
pub trait MacroProvider {
	/// The driver's macros. Empty by default.
	fn macros(&self) -> Macros {
		Macros::new()
	}
}

/// Uses the default macros only.
impl MacroProvider for () {}

/// A SQL datasource driver.
pub trait Driver: MacroProvider {
	/// How long a query against this datasource may run.
	/// Interpolation itself never consults this.
	fn timeout(&self, settings: &DriverSettings) -> Duration {
		settings.timeout()
	}
}
