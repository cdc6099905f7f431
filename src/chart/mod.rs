/// Chart layer: configuration → request → backend.
///
/// ```text
///   ChartConfig ──configure──▶ TimeSeriesRenderer
///                                  │ build(dataset)
///                                  ▼
///                              ChartRequest  (type, labels, datasets, options)
///                                  │ render
///                                  ▼
///                              ChartBackend  (named surfaces)
/// ```

pub mod axis;
pub mod config;
pub mod render;
pub mod request;
