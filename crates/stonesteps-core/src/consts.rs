/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Common median every flat is scaled to before combination.
pub const FLAT_TARGET_MEDIAN: f32 = 10_000.0;

/// Exposure time keyword (seconds).
pub const KEY_EXPTIME: &str = "EXPTIME";

/// Observer name keyword.
pub const KEY_OBSERVER: &str = "OBSERVER";

/// Observatory name keyword.
pub const KEY_OBSERVATORY: &str = "OBSERVAT";

/// Filter identifier keyword.
pub const KEY_FILTER: &str = "FILTER";

/// Data-reduction completion flag written by the RGB step.
pub const KEY_COMPLETE: &str = "COMPLETE";

/// Default lower percentile for RGB channel minimums.
pub const DEFAULT_MIN_PERCENTILE: f64 = 0.05;

/// Default upper percentile for the shared RGB maximum.
pub const DEFAULT_MAX_PERCENTILE: f64 = 0.999;

/// Number of channels in a color composite (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Label text height is image height divided by this.
pub const LABEL_HEIGHT_DIVISOR: f32 = 41.0;

/// Left label column x = width / this.
pub const LABEL_LEFT_X_DIVISOR: f32 = 100.0;

/// Right label column x = width / this.
pub const LABEL_RIGHT_X_DIVISOR: f32 = 1.15;

/// Label row y positions, y = height / divisor, top to bottom.
pub const LABEL_ROW_Y_DIVISORS: [f32; 3] = [1.114, 1.073, 1.035];

/// Font used for RGB labels when none is configured.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/liberation/LiberationSans-Regular.ttf";

/// Filename suffix of the master bias product.
pub const MASTER_BIAS_SUFFIX: &str = "MBIAS";

/// Filename suffix of the master flat product.
pub const MASTER_FLAT_SUFFIX: &str = "MFLAT";
