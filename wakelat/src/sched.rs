use wakelat_common::{Result, SchedulingHint, WakeError};

/// Apply `hint` to the calling thread.
///
/// Runs on the freshly created worker before its body starts, which gives the
/// worker explicit scheduling attributes rather than inheriting the driver's.
/// `SchedulingHint::Default` leaves the thread untouched.
pub fn apply_to_current_thread(hint: SchedulingHint) -> Result<()> {
    if !hint.is_realtime() {
        return Ok(());
    }
    set_current_policy(hint)
}

#[cfg(target_os = "linux")]
fn set_current_policy(hint: SchedulingHint) -> Result<()> {
    let (policy, priority) = match hint {
        SchedulingHint::Fifo(prio) => (libc::SCHED_FIFO, prio),
        SchedulingHint::Rr(prio) => (libc::SCHED_RR, prio),
        SchedulingHint::Default => return Ok(()),
    };
    let param = libc::sched_param { sched_priority: priority };
    // SAFETY: `pthread_self` is always a valid handle for the calling thread and
    // `param` outlives the call.
    let rc = unsafe { libc::pthread_setschedparam(libc::pthread_self(), policy, &param) };
    if rc != 0 {
        return Err(WakeError::SchedPolicy(
            hint.policy_name().to_string(),
            std::io::Error::from_raw_os_error(rc).to_string(),
        ));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_current_policy(hint: SchedulingHint) -> Result<()> {
    Err(WakeError::SchedPolicy(
        hint.policy_name().to_string(),
        "real-time policies are not supported on this platform".to_string(),
    ))
}
