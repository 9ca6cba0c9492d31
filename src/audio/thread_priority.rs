// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use thread_priority::{set_current_thread_priority, ThreadPriority, ThreadPriorityValue};
use tracing::{info, warn};

/// Priority of the playback worker when SOUNDBOARD_THREAD_PRIORITY is unset.
const DEFAULT_PLAYBACK_THREAD_PRIORITY: u8 = 70;

const PRIORITY_VAR: &str = "SOUNDBOARD_THREAD_PRIORITY";
const DISABLE_RT_VAR: &str = "SOUNDBOARD_DISABLE_RT_AUDIO";

/// Reads SOUNDBOARD_THREAD_PRIORITY (0-99), falling back to the default.
pub fn playback_thread_priority() -> ThreadPriority {
    let value = std::env::var(PRIORITY_VAR)
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|v| *v < 100)
        .unwrap_or(DEFAULT_PLAYBACK_THREAD_PRIORITY);

    ThreadPriorityValue::try_from(value)
        .map(ThreadPriority::Crossplatform)
        .unwrap_or(ThreadPriority::Max)
}

pub(crate) fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| {
            v == "1"
                || v.eq_ignore_ascii_case("true")
                || v.eq_ignore_ascii_case("yes")
                || v.eq_ignore_ascii_case("on")
        })
        .unwrap_or(false)
}

/// Returns whether the playback worker should try SCHED_FIFO. Enabled unless
/// SOUNDBOARD_DISABLE_RT_AUDIO is set.
pub fn rt_audio_enabled() -> bool {
    !env_flag(DISABLE_RT_VAR)
}

/// Raises the priority of the calling thread. Failures are logged and
/// otherwise ignored; playback still works at normal priority.
pub fn configure_playback_thread_priority(priority: ThreadPriority, rt_audio: bool) {
    if let Err(e) = set_current_thread_priority(priority) {
        warn!(error = ?e, "Failed to raise playback thread priority");
    }

    #[cfg(unix)]
    if rt_audio {
        use thread_priority::unix::{
            set_thread_priority_and_policy, thread_native_id, RealtimeThreadSchedulePolicy,
            ThreadSchedulePolicy,
        };
        let tid = thread_native_id();
        match set_thread_priority_and_policy(
            tid,
            priority,
            ThreadSchedulePolicy::Realtime(RealtimeThreadSchedulePolicy::Fifo),
        ) {
            Ok(()) => {
                info!("Enabled RT SCHED_FIFO for playback thread");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to set RT SCHED_FIFO for playback thread"
                );
            }
        }
    }

    #[cfg(not(unix))]
    let _ = rt_audio;
}

#[cfg(test)]
mod test {
    use super::env_flag;

    #[test]
    fn test_env_flag_unset() {
        assert!(!env_flag("SOUNDBOARD_TEST_FLAG_THAT_IS_NEVER_SET"));
    }
}
