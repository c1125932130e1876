#![warn(clippy::pedantic, clippy::perf, missing_docs)]

/*!
Expands macros in templated SQL before it is sent to a datasource.

A macro is written `$__name` or `$__name(arg, ...)`. Every invocation is replaced with the
output of the macro registered under that name. A handful of defaults cover time range
filtering and table or column substitution, and drivers can add their own or replace the defaults.

```
use sqlmacro::{interpolate, Query};

let query = Query::new("select $__column from $__table where $__timeFilter(ts)")
	.with_table("metrics")
	.with_column("value");
assert_eq!(
	interpolate(&(), &query).unwrap(),
	"select value from metrics where ts >= '0001-01-01T00:00:00Z' AND ts <= '0001-01-01T00:00:00Z'"
);
```
*/

pub mod config;
pub mod driver;
pub mod execution;
pub mod parsing;
pub mod query;
pub mod registry;
pub mod stdlib;

pub use config::DriverSettings;
pub use driver::{Driver, MacroProvider};
pub use execution::{interpolate, InterpolationError, Interpolator, Macro, MacroError, MacroErrorKind};
pub use query::{Format, Query, TimeRange};
pub use registry::Macros;
pub use stdlib::default_macros;
