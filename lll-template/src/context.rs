// Process context: the OS facts a template can reference (pid, ppid, clock)

use chrono::{DateTime, Local};

/// Source of process identifiers and the current time for `%p`, `%P` and `%T`
pub trait ProcessContext {
    fn pid(&self) -> u32;
    fn ppid(&self) -> u32;
    fn now(&self) -> DateTime<Local>;
}

/// The running process and the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl ProcessContext for SystemContext {
    fn pid(&self) -> u32 {
        std::process::id()
    }

    #[cfg(unix)]
    fn ppid(&self) -> u32 {
        std::os::unix::process::parent_id()
    }

    #[cfg(not(unix))]
    fn ppid(&self) -> u32 {
        0
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fixed identifiers and a frozen clock, for reproducible output
#[derive(Debug, Clone)]
pub struct FixedContext {
    pub pid: u32,
    pub ppid: u32,
    pub now: DateTime<Local>,
}

impl FixedContext {
    pub fn new(pid: u32, ppid: u32, now: DateTime<Local>) -> Self {
        Self { pid, ppid, now }
    }
}

impl ProcessContext for FixedContext {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn ppid(&self) -> u32 {
        self.ppid
    }

    fn now(&self) -> DateTime<Local> {
        self.now
    }
}

impl<C: ProcessContext + ?Sized> ProcessContext for &C {
    fn pid(&self) -> u32 {
        (**self).pid()
    }

    fn ppid(&self) -> u32 {
        (**self).ppid()
    }

    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_context_reports_own_pid() {
        assert_eq!(SystemContext.pid(), std::process::id());
    }

    #[test]
    fn test_fixed_context() {
        let now = Local::now();
        let ctx = FixedContext::new(42, 1, now);
        assert_eq!(ctx.pid(), 42);
        assert_eq!(ctx.ppid(), 1);
        assert_eq!(ctx.now(), now);
    }
}
