//! `perf_event_open(2)` plumbing for the counter group.
//!
//! # Permissions
//!
//! Linux perf requires one of:
//! - Root/sudo privileges
//! - `CAP_PERFMON` capability (kernel 5.8+)
//! - `kernel.perf_event_paranoid <= 2` (check with `cat /proc/sys/kernel/perf_event_paranoid`)
//!
//! Counters are opened for user space only (`exclude_kernel`,
//! `exclude_hv`), so the default paranoid level of 2 is enough on most
//! distributions. Containers and VMs frequently expose no PMU at all; the
//! open then fails with `ENOENT` and the harness runs without counters.

use std::fs::File;
use std::io;

use super::counters::EventSpec;

/// Open one counter, joining `group` when given.
///
/// The counter starts enabled and counts the calling thread on any CPU.
#[cfg(all(target_os = "linux", feature = "perf"))]
pub fn open_counter(spec: &EventSpec, group: Option<&File>) -> io::Result<File> {
    use perf_event_open_sys::bindings::{
        perf_event_attr, PERF_FLAG_FD_CLOEXEC, PERF_FORMAT_GROUP, PERF_FORMAT_ID,
        PERF_TYPE_HARDWARE,
    };
    use perf_event_open_sys::perf_event_open;
    use std::os::fd::{AsRawFd, FromRawFd};

    use super::counters::CounterType;

    let type_ = match spec.counter_type {
        CounterType::Hardware => PERF_TYPE_HARDWARE,
    };

    let mut attrs = perf_event_attr {
        size: std::mem::size_of::<perf_event_attr>() as u32,
        type_,
        config: spec.config,
        read_format: (PERF_FORMAT_GROUP | PERF_FORMAT_ID) as u64,
        ..perf_event_attr::default()
    };
    attrs.__bindgen_anon_1.sample_period = 0;
    attrs.set_exclude_kernel(1);
    attrs.set_exclude_hv(1);

    let group_fd = group.map_or(-1, |g| g.as_raw_fd());

    // SAFETY: `attrs` is a fully initialized perf_event_attr whose `size`
    // matches the struct the kernel will read.
    let fd = unsafe {
        perf_event_open(&mut attrs, 0, -1, group_fd, PERF_FLAG_FD_CLOEXEC as _)
    };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `fd` was just returned by the kernel and is owned by nobody else.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Counters are unavailable on this build; every open fails.
#[cfg(not(all(target_os = "linux", feature = "perf")))]
pub fn open_counter(spec: &EventSpec, _group: Option<&File>) -> io::Result<File> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!(
            "{}: hardware counters require Linux and the `perf` feature",
            spec.name
        ),
    ))
}
