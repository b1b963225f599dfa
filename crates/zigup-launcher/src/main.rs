//! Default-pointer launcher.
//!
//! This binary embeds a marker followed by a null-terminated path buffer.
//! zigup copies the launcher to the pointer location with the target
//! compiler path spliced into that buffer; running the copy re-executes the
//! stored target with the original arguments and stdio.
//!
//! The buffer contents are read through a volatile copy: the bytes in the
//! on-disk image are patched after linking, so the initializer values the
//! compiler sees here are not the values present at run time.

use std::process::Command;

const MARKER: &[u8] = b"!!!THIS MARKS THE zig_exe_string MEMORY!!#";
const MARKER_LEN: usize = MARKER.len();

/// Longest target path plus its null terminator. Must match the splice
/// layout zigup writes.
const TARGET_BUF_LEN: usize = 4097;

const fn payload_init() -> [u8; MARKER_LEN + TARGET_BUF_LEN] {
    let mut out = [0u8; MARKER_LEN + TARGET_BUF_LEN];
    let mut i = 0;
    while i < MARKER_LEN {
        out[i] = MARKER[i];
        i += 1;
    }
    out
}

#[used]
#[unsafe(no_mangle)]
static ZIG_EXE_PAYLOAD: [u8; MARKER_LEN + TARGET_BUF_LEN] = payload_init();

fn embedded_target() -> Result<String, String> {
    let payload = unsafe { std::ptr::read_volatile(&ZIG_EXE_PAYLOAD) };
    let buf = &payload[MARKER_LEN..];
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or("target buffer is not null-terminated")?;
    if nul == 0 {
        return Err("this launcher has not been configured by zigup".into());
    }
    String::from_utf8(buf[..nul].to_vec()).map_err(|_| "target path is not valid UTF-8".into())
}

#[cfg(windows)]
mod console {
    // Keep the parent alive through Ctrl-C so the child receives the event,
    // terminates, and the parent can exit with the child's code.
    type Handler = unsafe extern "system" fn(u32) -> i32;

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn SetConsoleCtrlHandler(handler: Option<Handler>, add: i32) -> i32;
    }

    unsafe extern "system" fn ignore(_ctrl_type: u32) -> i32 {
        1 // handled; do not kill this process
    }

    pub fn install() {
        unsafe {
            SetConsoleCtrlHandler(Some(ignore), 1);
        }
    }
}

fn main() {
    let target = match embedded_target() {
        Ok(target) => target,
        Err(message) => {
            eprintln!("zigup-launcher: {}", message);
            std::process::exit(1);
        }
    };

    let args: Vec<_> = std::env::args_os().skip(1).collect();

    #[cfg(windows)]
    {
        console::install();
        let status = Command::new(&target).args(args).status();
        match status {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(e) => {
                eprintln!("zigup-launcher: failed to run {}: {}", target, e);
                std::process::exit(1);
            }
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // exec never returns on success.
        let e = Command::new(&target).args(args).exec();
        eprintln!("zigup-launcher: failed to run {}: {}", target, e);
        std::process::exit(1);
    }

    #[cfg(not(any(unix, windows)))]
    {
        let status = Command::new(&target).args(args).status();
        match status {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(e) => {
                eprintln!("zigup-launcher: failed to run {}: {}", target, e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_layout_matches_the_splicer() {
        assert_eq!(MARKER, zigup_toolchain::launcher::MARKER);
        assert_eq!(TARGET_BUF_LEN, zigup_toolchain::launcher::TARGET_BUF_LEN);
    }

    #[test]
    fn test_unspliced_payload_reports_unconfigured() {
        let err = embedded_target().unwrap_err();
        assert!(err.contains("not been configured"));
    }
}
