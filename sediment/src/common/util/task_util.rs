use crate::errors::{ErrorKind, SedimentError, SedimentResult};

/// Runs a set of fallible checks concurrently on scoped threads and joins
/// all of them before returning.
///
/// Every check runs to completion; the overall result is the join of all
/// checks with the first failure (in submission order) reported. This is the
/// fan-out/join point used by the uniqueness enforcer: checks are read-only
/// and nothing proceeds until every one of them has finished.
///
/// # Arguments
/// * `checks` - The closures to run; each returns `Ok(())` or the failure
///   that should abort the surrounding operation
///
/// # Returns
/// * `Ok(())` when every check passed
/// * The first check failure otherwise
pub fn fan_out_join<F>(checks: Vec<F>) -> SedimentResult<()>
where
    F: FnOnce() -> SedimentResult<()> + Send,
{
    if checks.is_empty() {
        return Ok(());
    }

    // single check: no reason to pay for a thread
    if checks.len() == 1 {
        let check = checks.into_iter().next().ok_or_else(|| {
            SedimentError::new("check list emptied concurrently", ErrorKind::InternalError)
        })?;
        return check();
    }

    let mut results: Vec<SedimentResult<()>> = Vec::with_capacity(checks.len());
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(checks.len());
        for check in checks {
            handles.push(scope.spawn(check));
        }
        for handle in handles {
            match handle.join() {
                Ok(result) => results.push(result),
                Err(_) => {
                    log::error!("a fanned-out check panicked before completing");
                    results.push(Err(SedimentError::new(
                        "concurrent check panicked",
                        ErrorKind::InternalError,
                    )));
                }
            }
        }
    });

    for result in results {
        result?;
    }
    Ok(())
}
