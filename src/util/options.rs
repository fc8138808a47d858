use crate::util::log::{trace, warn};
use std::default::Default;

/// The prefix of environment variables that set incinerator options.
/// For example, `INCINERATOR_PASS_DELAY_MS=0` sets `pass_delay_ms` to zero.
pub const ENV_VAR_PREFIX: &str = "INCINERATOR_";

/// The default delay between a trigger and the start of the pass it requests.
pub const DEFAULT_PASS_DELAY_MS: u64 = 300;

/// The default initial capacity of the heap walker worklist.
pub const DEFAULT_WORKLIST_CAPACITY: usize = 1024;

fn always_valid<T>(_: &T) -> bool {
    true
}

macro_rules! options {
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*,) => [
        options!($($(#[$outer])* $name: $type[$validator] = $default),*);
    ];
    ($($(#[$outer:meta])* $name:ident: $type:ty[$validator:expr] = $default:expr),*) => [
        /// Incinerator options. Each field can be set from an environment variable with the
        /// [`ENV_VAR_PREFIX`] prefix, or by calling [`crate::memory_manager::process`] before
        /// the incinerator is created.
        #[derive(Clone, Debug)]
        pub struct Options {
            $($(#[$outer])* pub $name: $type),*
        }

        impl Options {
            /// Set an option from a string. Returns false if the key is unknown, or the value
            /// cannot be parsed or fails validation. The option is unchanged in that case.
            pub fn set_from_str(&mut self, s: &str, val: &str) -> bool {
                match s {
                    // Parse the given value from str (by env vars or by calling process()) to the right type
                    $(stringify!($name) => if let Ok(typed_val) = val.parse::<$type>() {
                        let validate_fn = $validator;
                        let is_valid = validate_fn(&typed_val);
                        if is_valid {
                            // Only set value if valid.
                            self.$name = typed_val;
                        } else {
                            warn!("Unable to set {}={:?}. Invalid value. Default value will be used.", s, val);
                        }
                        is_valid
                    } else {
                        warn!("Unable to set {}={:?}. Can't parse value. Default value will be used.", s, val);
                        false
                    })*
                    _ => {
                        warn!("Unknown incinerator option {:?}", s);
                        false
                    }
                }
            }

            /// Read options from environment variables, and apply them over the current values.
            /// Environment variables that start with the prefix but match no option are ignored.
            pub fn read_env_var_settings(&mut self) {
                for (key, val) in std::env::vars() {
                    // strip the prefix, and get the lower case string
                    if let Some(rest_of_key) = key.strip_prefix(ENV_VAR_PREFIX) {
                        let lowercase: &str = &rest_of_key.to_lowercase();
                        match lowercase {
                            $(stringify!($name) => { self.set_from_str(lowercase, &val); },)*
                            _ => {}
                        }
                    }
                }
            }
        }

        impl Default for Options {
            fn default() -> Self {
                Options {
                    $($name: $default),*
                }
            }
        }
    ]
}

options! {
    /// Whether the incinerator is active at all. When false, `initialize` does nothing and
    /// no worker is started.
    enabled:                bool   [always_valid] = true,
    /// How long the worker sleeps after a trigger before it brings the VM to a safepoint.
    /// Triggers arriving during the delay are absorbed into the same pass.
    pass_delay_ms:          u64    [always_valid] = DEFAULT_PASS_DELAY_MS,
    /// Defer clearing until the end of a pass, so that references reachable from pending
    /// finalizers can be spared. When false, stale references are cleared as soon as they
    /// are discovered.
    defer_for_finalization: bool   [always_valid] = true,
    /// Initial capacity of the heap walker worklist.
    worklist_capacity:      usize  [|v: &usize| *v > 0] = DEFAULT_WORKLIST_CAPACITY,
}

impl Options {
    /// Set options in bulk from a space-separated list of `key=value` pairs, such as
    /// `"pass_delay_ms=0 enabled=true"`. Returns false if any pair is malformed or rejected.
    /// Pairs before a rejected one are still applied.
    pub fn set_bulk_from_command_line(&mut self, options: &str) -> bool {
        for opt in options.split_ascii_whitespace() {
            trace!("Trying to process option pair: {}", opt);
            let Some((key, val)) = opt.split_once('=') else {
                warn!("Malformed incinerator option {:?}, expected key=value", opt);
                return false;
            };
            if !self.set_from_str(key, val) {
                return false;
            }
        }
        true
    }
}
