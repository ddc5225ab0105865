//! Interactive kernel shell.
//!
//! Line-edited read-eval-dispatch over the HAL input and display
//! surfaces. The line buffer is owned exclusively by the shell loop;
//! dispatch tokenizes it into at most [`SHELL_MAX_ARGS`] argument slices
//! with no quoting or escaping.

use crate::config::{SHELL_LINE_CAP, SHELL_MAX_ARGS};

pub const PROMPT: &str = "noxiom> ";

/// Split a line on runs of spaces into at most `SHELL_MAX_ARGS` tokens.
/// Tokens beyond the limit are dropped.
pub fn tokenize<'a>(line: &'a str) -> heapless::Vec<&'a str, SHELL_MAX_ARGS> {
    let mut argv = heapless::Vec::new();
    for tok in line.split(' ') {
        if tok.is_empty() {
            continue;
        }
        if argv.push(tok).is_err() {
            break;
        }
    }
    argv
}

#[cfg(target_os = "none")]
pub use self::run_loop::Shell;

#[cfg(target_os = "none")]
mod run_loop {
    use core::fmt::Write;

    use super::{tokenize, PROMPT, SHELL_LINE_CAP};
    use crate::{config, hal, hwinfo, klib};

    pub struct Shell {
        buffer: [u8; SHELL_LINE_CAP],
        running: bool,
    }

    impl Shell {
        pub fn new() -> Self {
            Shell {
                buffer: [0; SHELL_LINE_CAP],
                running: true,
            }
        }

        /// Read-dispatch loop. Returns only after a `halt` command; the
        /// portable entry then invokes the HAL halt.
        pub fn run(&mut self) {
            while self.running {
                hal::display_print(PROMPT);
                let len = self.read_line();
                self.dispatch(len);
            }
        }

        /// Collect one line with editing: printables append (excess
        /// silently dropped), backspace erases in buffer and on screen,
        /// newline commits.
        fn read_line(&mut self) -> usize {
            let mut len = 0usize;
            loop {
                match hal::input_getchar() {
                    b'\n' => {
                        hal::display_putchar(b'\n');
                        self.buffer[len] = 0;
                        return len;
                    }
                    0x08 => {
                        if len > 0 {
                            len -= 1;
                            hal::display_print("\x08 \x08");
                        }
                    }
                    c if (0x20..0x7F).contains(&c) => {
                        if len < SHELL_LINE_CAP - 1 {
                            self.buffer[len] = c;
                            len += 1;
                            hal::display_putchar(c);
                        }
                    }
                    _ => {}
                }
            }
        }

        fn dispatch(&mut self, len: usize) {
            let line = core::str::from_utf8(&self.buffer[..len]).unwrap_or("");
            let argv = tokenize(line);

            let Some(&cmd) = argv.first() else {
                // Empty line: no output, just reprompt.
                return;
            };

            match cmd {
                "help" => self.cmd_help(),
                "clear" => hal::display_clear(),
                "echo" => self.cmd_echo(&argv[1..]),
                "version" => self.cmd_version(),
                "info" => self.cmd_info(),
                "dmesg" => self.cmd_dmesg(),
                "halt" => {
                    hal::display_print("System halted.\n");
                    self.running = false;
                }
                other => {
                    hal::display_print("Unknown command: ");
                    hal::display_print(other);
                    hal::display_putchar(b'\n');
                }
            }
        }

        fn cmd_help(&self) {
            hal::display_print(
                "Commands:\n\
                 \x20 help     - list commands\n\
                 \x20 clear    - clear the display\n\
                 \x20 echo     - print arguments\n\
                 \x20 version  - kernel version\n\
                 \x20 info     - hardware summary\n\
                 \x20 dmesg    - replay boot log\n\
                 \x20 halt     - stop the machine\n",
            );
        }

        fn cmd_echo(&self, args: &[&str]) {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    hal::display_putchar(b' ');
                }
                hal::display_print(arg);
            }
            hal::display_putchar(b'\n');
        }

        fn cmd_version(&self) {
            let mut line: heapless::String<96> = heapless::String::new();
            let _ = write!(
                line,
                "noxiom {} ({}, {})\n",
                config::VERSION,
                config::GIT_COMMIT.unwrap_or("unknown"),
                config::BUILD_TARGET.unwrap_or("unknown"),
            );
            hal::display_print(&line);
        }

        fn cmd_info(&self) {
            let Some(hw) = hwinfo::get() else {
                hal::display_print("hardware descriptor not published\n");
                return;
            };

            let mut out: heapless::String<384> = heapless::String::new();
            let _ = write!(
                out,
                "arch:      {:?}\n\
                 model:     {}\n\
                 cores:     {}\n\
                 ram:       {} MiB\n\
                 tier:      {}\n",
                hw.arch,
                hw.model.as_str(),
                hw.cpu_cores,
                hw.ram_bytes / (1024 * 1024),
                hw.tier,
            );
            if !hw.compat.is_empty() {
                let _ = write!(out, "compat:    {}\n", hw.compat.as_str());
            }
            if hw.uart_base != 0 {
                let _ = write!(out, "uart:      {:#x}\n", hw.uart_base);
            }
            if hw.intc_dist_base != 0 {
                let _ = write!(
                    out,
                    "intc:      {:#x} / {:#x}\n",
                    hw.intc_dist_base, hw.intc_base
                );
            }
            hal::display_print(&out);
        }

        fn cmd_dmesg(&self) {
            klib::printk::replay(|entry| {
                hal::display_print("[");
                hal::display_print(entry.level.as_str());
                hal::display_print("] ");
                hal::display_print(entry.text());
                hal::display_putchar(b'\n');
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_space_runs() {
        let argv = tokenize("echo   hello  world");
        assert_eq!(argv.as_slice(), &["echo", "hello", "world"]);
    }

    #[test]
    fn tokenize_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("     ").is_empty());
    }

    #[test]
    fn tokenize_caps_argv() {
        let line = "a b c d e f g h i j k l m n o p q r";
        let argv = tokenize(line);
        assert_eq!(argv.len(), SHELL_MAX_ARGS);
        assert_eq!(argv[0], "a");
        assert_eq!(argv[SHELL_MAX_ARGS - 1], "p");
    }

    #[test]
    fn tokenize_roundtrip_single_spaced() {
        // For single-space-separated input with no leading/trailing
        // spaces, joining argv reproduces the line.
        let line = "one two three four";
        let argv = tokenize(line);
        let mut rebuilt = std::string::String::new();
        for (i, tok) in argv.iter().enumerate() {
            if i > 0 {
                rebuilt.push(' ');
            }
            rebuilt.push_str(tok);
        }
        assert_eq!(rebuilt, line);
    }
}
