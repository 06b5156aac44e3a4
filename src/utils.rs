/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}

/// Parse `"rot,tilt,psi"` (degrees) as Euler angles
pub fn parse_angles(s: &str) -> Result<geometry::EulerAngles, String> {
    let v = s.split(',').map(str::trim).collect::<Vec<_>>();
    if v.len() != 3 {
        return Err(format!("expected 3 comma-separated angles, found `{s}`"))
    }
    let parse = |x: &str| x.parse::<f64>().map_err(|e| format!("`{x}`: {e}"));
    Ok(geometry::EulerAngles::from_degrees(parse(v[0])?, parse(v[1])?, parse(v[2])?))
}

pub mod timing {

    use super::group_digits;
    use std::time::Instant;
    use std::io::Write;

    pub struct Progress {
        previous: Instant,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now() } }

        /// Print message, append ellipsis, flush stdout, stay on same line, start timer.
        pub fn start(&mut self, message: &str) {
            print!("{message} ... ");
            // Progress output is best-effort
            let _ = std::io::stdout().flush();
            self.start_timer();
        }

        // Print time elapsed since last start or done
        pub fn done(&mut self) {
            println!("{} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        // Print message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            println!("{message}: {} ms",
                     group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}
