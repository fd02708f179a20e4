//! Sound output
//!
//! # Implementation
//!
//! Tones and playback use the `beep`, `aplay` and `espeak` programs shipped
//! with ev3dev, so those need to be installed. The volume is an attribute of
//! the EV3 sound platform device.
use std::{
    path::PathBuf,
    process::{Child, Command, Stdio},
};

use log::debug;

use crate::{
    error::{DeviceError, Result},
    system::SystemRoot,
    util::{parse_int, read_attr, write_attr},
};

/// Volume attribute, relative to the sys root
const VOLUME: &str = "devices/platform/snd-legoev3/volume";

/// espeak amplitude, 0 to 200
const SPEAK_AMPLITUDE: &str = "200";

fn command_error(command: &str, reason: impl ToString) -> DeviceError {
    DeviceError::Command {
        command: command.into(),
        reason: reason.to_string(),
    }
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

fn spawn(mut command: Command) -> Result<Child> {
    debug!("Running {:?}", command);
    command
        .spawn()
        .map_err(|e| command_error(&program_name(&command), e))
}

/// Wait for `child`, failing if it exited unsuccessfully
fn finish(name: &str, child: &mut Child) -> Result<()> {
    let status = child.wait().map_err(|e| command_error(name, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(command_error(name, status))
    }
}

/// Kill and reap a child whose output is no longer wanted
fn abandon(child: &mut Child) {
    // Fails if it already exited, which is fine.
    let _ = child.kill();
    let _ = child.wait();
}

/// Spawn `command`, waiting for it to exit if `synchronous`
fn run(command: Command, synchronous: bool) -> Result<Option<Child>> {
    let name = program_name(&command);
    let mut child = spawn(command)?;
    if !synchronous {
        return Ok(Some(child));
    }
    finish(&name, &mut child)?;
    Ok(None)
}

/// Programs used for sound output
///
/// Defaults to looking up `beep`, `aplay` and `espeak` in `PATH`.
#[derive(Debug, Clone)]
pub struct Programs {
    pub beep: PathBuf,
    pub aplay: PathBuf,
    pub espeak: PathBuf,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            beep: "beep".into(),
            aplay: "aplay".into(),
            espeak: "espeak".into(),
        }
    }
}

/// A running `espeak | aplay` pipeline, from [`Sound::speak`]
///
/// Both processes must be reaped with [`Speech::wait`] or [`Speech::kill`].
#[derive(Debug)]
pub struct Speech {
    espeak: Child,
    aplay: Child,
}

impl Speech {
    /// Wait for both processes to exit
    ///
    /// # Errors
    ///
    /// [`DeviceError::Command`] if either exited unsuccessfully. Both are
    /// reaped regardless.
    pub fn wait(&mut self) -> Result<()> {
        let player = finish("aplay", &mut self.aplay);
        let speech = finish("espeak", &mut self.espeak);
        player.and(speech)
    }

    /// Whether both processes have exited, reaping those that have
    pub fn try_wait(&mut self) -> Result<bool> {
        let player = self
            .aplay
            .try_wait()
            .map_err(|e| command_error("aplay", e))?;
        let speech = self
            .espeak
            .try_wait()
            .map_err(|e| command_error("espeak", e))?;
        Ok(player.is_some() && speech.is_some())
    }

    /// Stop speaking
    pub fn kill(&mut self) {
        abandon(&mut self.aplay);
        abandon(&mut self.espeak);
    }
}

/// The EV3 speaker
#[derive(Debug, Clone)]
pub struct Sound {
    volume: PathBuf,
    programs: Programs,
}

impl Default for Sound {
    fn default() -> Self {
        Self::new_in(&SystemRoot::default())
    }
}

impl Sound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_in(root: &SystemRoot) -> Self {
        Self::with_programs(root, Programs::default())
    }

    /// Use `programs` instead of looking them up in `PATH`
    pub fn with_programs(root: &SystemRoot, programs: Programs) -> Self {
        Self {
            volume: root.sys().join(VOLUME),
            programs,
        }
    }

    /// A short beep, waiting for it to finish
    pub fn beep(&self) -> Result<()> {
        run(Command::new(&self.programs.beep), true).map(|_| ())
    }

    /// Play `frequency` Hz for `ms` milliseconds, waiting for it to finish
    pub fn tone(&self, frequency: u32, ms: u32) -> Result<()> {
        let mut cmd = Command::new(&self.programs.beep);
        cmd.arg("-f")
            .arg(frequency.to_string())
            .arg("-l")
            .arg(ms.to_string());
        run(cmd, true).map(|_| ())
    }

    /// Play a sound file.
    ///
    /// If not `synchronous` the player is returned while still running.
    pub fn play(&self, file: &str, synchronous: bool) -> Result<Option<Child>> {
        let mut cmd = Command::new(&self.programs.aplay);
        cmd.arg("-q").arg(file);
        run(cmd, synchronous)
    }

    /// Speak `text`, using espeak piped into aplay.
    ///
    /// If not `synchronous` the pipeline is returned while still running.
    pub fn speak(&self, text: &str, synchronous: bool) -> Result<Option<Speech>> {
        let mut espeak = Command::new(&self.programs.espeak);
        espeak
            .args(["-a", SPEAK_AMPLITUDE, "--stdout"])
            .arg(text)
            .stdout(Stdio::piped());
        let mut speech = spawn(espeak)?;
        let stdout = match speech.stdout.take() {
            Some(stdout) => stdout,
            None => {
                abandon(&mut speech);
                return Err(command_error("espeak", "no stdout"));
            }
        };

        let mut aplay = Command::new(&self.programs.aplay);
        aplay.arg("-q").stdin(stdout);
        let player = match spawn(aplay) {
            Ok(player) => player,
            Err(e) => {
                abandon(&mut speech);
                return Err(e);
            }
        };

        let mut pipeline = Speech {
            espeak: speech,
            aplay: player,
        };
        if !synchronous {
            return Ok(Some(pipeline));
        }
        pipeline.wait()?;
        Ok(None)
    }

    /// Current volume, in percent
    pub fn volume(&self) -> Result<u32> {
        let value = parse_int("volume", &read_attr(&self.volume)?)?;
        u32::try_from(value).map_err(|_| DeviceError::InvalidValue {
            attribute: "volume".into(),
            value: value.to_string(),
        })
    }

    /// Set the volume, 0 to 100 percent
    pub fn set_volume(&self, volume: u32) -> Result<()> {
        write_attr(&self.volume, &volume.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{read, FakeRoot};
    use anyhow::Result;
    use std::{
        path::Path,
        sync::{Mutex, MutexGuard},
    };

    /// Tests that spawn the fake programs hold this, so no other test forks
    /// while a script is still open for writing.
    static SPAWN: Mutex<()> = Mutex::new(());

    fn spawn_lock() -> MutexGuard<'static, ()> {
        SPAWN.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records its arguments to `<program>.args`
    const RECORD: &str = r#"printf '%s\n' "$*" > "$0.args""#;

    fn args(program: &Path) -> String {
        read(&program.with_extension("args"))
    }

    fn programs(fake: &FakeRoot) -> Programs {
        Programs {
            beep: fake.program("beep", RECORD),
            aplay: fake.program("aplay", &format!("cat > \"$0.stdin\"\n{}", RECORD)),
            espeak: fake.program("espeak", &format!("{}\nprintf speech", RECORD)),
        }
    }

    #[test]
    fn beep_and_tone() -> Result<()> {
        let _lock = spawn_lock();
        let fake = FakeRoot::new();
        let programs = programs(&fake);
        let sound = Sound::with_programs(fake.root(), programs.clone());

        sound.beep()?;
        assert_eq!(args(&programs.beep), "");
        sound.tone(440, 200)?;
        assert_eq!(args(&programs.beep), "-f 440 -l 200");
        Ok(())
    }

    #[test]
    fn play() -> Result<()> {
        let _lock = spawn_lock();
        let fake = FakeRoot::new();
        let programs = programs(&fake);
        let sound = Sound::with_programs(fake.root(), programs.clone());

        assert!(sound.play("/dev/null", true)?.is_none());
        assert_eq!(args(&programs.aplay), "-q /dev/null");

        let mut child = sound.play("startup.wav", false)?.expect("running player");
        assert!(child.wait()?.success());
        assert_eq!(args(&programs.aplay), "-q startup.wav");
        Ok(())
    }

    #[test]
    fn speak_pipes_espeak_into_aplay() -> Result<()> {
        let _lock = spawn_lock();
        let fake = FakeRoot::new();
        let programs = programs(&fake);
        let sound = Sound::with_programs(fake.root(), programs.clone());

        assert!(sound.speak("hello", true)?.is_none());
        assert_eq!(args(&programs.espeak), "-a 200 --stdout hello");
        assert_eq!(args(&programs.aplay), "-q");
        assert_eq!(read(&programs.aplay.with_extension("stdin")), "speech");
        Ok(())
    }

    #[test]
    fn speak_async_reaps_both() -> Result<()> {
        let _lock = spawn_lock();
        let fake = FakeRoot::new();
        let sound = Sound::with_programs(fake.root(), programs(&fake));

        let mut speech = sound.speak("hello", false)?.expect("running pipeline");
        speech.wait()?;
        assert!(speech.try_wait()?);
        Ok(())
    }

    #[test]
    fn failing_programs() -> Result<()> {
        let _lock = spawn_lock();
        let fake = FakeRoot::new();
        let failing = Programs {
            beep: fake.program("beep", "exit 3"),
            aplay: fake.program("aplay", "cat > /dev/null\nexit 1"),
            espeak: fake.program("espeak", "printf speech"),
        };
        let sound = Sound::with_programs(fake.root(), failing.clone());

        assert!(matches!(sound.tone(440, 200), Err(DeviceError::Command { .. })));
        assert!(matches!(sound.play("a.wav", true), Err(DeviceError::Command { .. })));
        match sound.speak("hello", true) {
            Err(DeviceError::Command { command, .. }) => assert_eq!(command, "aplay"),
            other => panic!("expected aplay to fail, got {:?}", other.map(|_| ())),
        }

        let mut speech = sound.speak("hello", false)?.expect("running pipeline");
        assert!(speech.wait().is_err());
        assert!(speech.try_wait()?);

        let missing = Sound::with_programs(
            fake.root(),
            Programs {
                aplay: fake.root().sys().join("no-such-aplay"),
                ..failing
            },
        );
        assert!(matches!(missing.speak("hello", true), Err(DeviceError::Command { .. })));
        Ok(())
    }

    #[test]
    fn volume() -> Result<()> {
        let fake = FakeRoot::new();
        let path = fake.sys_file(VOLUME, "40");
        let sound = Sound::new_in(fake.root());

        assert_eq!(sound.volume()?, 40);
        sound.set_volume(75)?;
        assert_eq!(read(&path), "75");
        assert_eq!(sound.volume()?, 75);

        std::fs::write(&path, "-1\n")?;
        assert!(sound.volume().is_err());
        Ok(())
    }

    #[test]
    fn no_volume_control() {
        let fake = FakeRoot::new();
        let sound = Sound::new_in(fake.root());
        assert!(sound.volume().is_err());
        assert!(sound.set_volume(10).is_err());
    }
}
