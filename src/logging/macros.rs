/*!
 * Formatted emission macros.
 *
 * `infof!(log, "user {} connected", id)` checks the level first, so the
 * arguments are only formatted when the record will be written. `log` may be
 * a `LogFacility`, a reference to one or an `Arc<LogFacility>`.
 */

#[doc(hidden)]
#[macro_export]
macro_rules! __applog_emitf {
    ($method:ident, $level:ident, $log:expr, $($arg:tt)+) => {{
        let log = &$log;
        if log.is_enabled($crate::LogLevel::$level) {
            log.$method(::std::format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! debugf {
    ($log:expr, $($arg:tt)+) => {
        $crate::__applog_emitf!(debugf, Debug, $log, $($arg)+)
    };
}

#[macro_export]
macro_rules! infof {
    ($log:expr, $($arg:tt)+) => {
        $crate::__applog_emitf!(infof, Info, $log, $($arg)+)
    };
}

#[macro_export]
macro_rules! warnf {
    ($log:expr, $($arg:tt)+) => {
        $crate::__applog_emitf!(warnf, Warn, $log, $($arg)+)
    };
}

#[macro_export]
macro_rules! errorf {
    ($log:expr, $($arg:tt)+) => {
        $crate::__applog_emitf!(errorf, Error, $log, $($arg)+)
    };
}

/// Always emits, then exits the process with status 1.
#[macro_export]
macro_rules! fatalf {
    ($log:expr, $($arg:tt)+) => {
        $log.fatalf(::std::format_args!($($arg)+))
    };
}
