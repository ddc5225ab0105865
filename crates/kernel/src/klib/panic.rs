// Kernel panic path: report and stop.
//
// A panic in this kernel is always terminal. The handler reclaims the
// output locks (the panicking context may hold one and will never
// resume), reports over the serial sink and - once display bring-up has
// completed - on the display, then halts. Before `display_init` the
// display state is unknown and only serial is touched.

use core::fmt::Write;
use core::panic::PanicInfo;

use crate::hal::{self, color};

struct SerialSink;

impl Write for SerialSink {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        hal::serial_print(s);
        Ok(())
    }
}

struct DisplaySink;

impl Write for DisplaySink {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        hal::display_print(s);
        Ok(())
    }
}

fn report(out: &mut impl Write, info: &PanicInfo) {
    let _ = out.write_str("\n*** KERNEL PANIC ***\n");
    if let Some(location) = info.location() {
        let _ = write!(
            out,
            "at {}:{}:{}\n",
            location.file(),
            location.line(),
            location.column()
        );
    }
    let _ = write!(out, "{}\n", info.message());
}

pub fn panic_handler(info: &PanicInfo) -> ! {
    unsafe { hal::output_force_unlock() };

    report(&mut SerialSink, info);

    if hal::display_ready() {
        hal::display_set_color(color::attr(color::LIGHT_RED, color::BLACK));
        report(&mut DisplaySink, info);
    }

    hal::halt()
}
