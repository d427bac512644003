/// Provides the recommended log filter for programs which want to exclude particularly noisy
/// details of this library's dependencies.
///
/// The guiding principle for this filtering is that at [`log::Level::Debug`] or lower level,
/// there should be no messages produced per vertex unless something is wrong; those belong
/// to [`log::Level::Trace`], which this filter leaves alone for our own targets.
pub fn standard_filter(metadata: &log::Metadata<'_>) -> bool {
    let target = metadata.target();

    !(target.starts_with("rayon") // thread pool lifecycle, including `rayon_core`
        || target.starts_with("tracing::span")) // logs every single tracing span
}
