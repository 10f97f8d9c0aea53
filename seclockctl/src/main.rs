//! Interactive front-end for the seclock control channel.
//!
//! Connects to the controller's Unix socket and issues SET/RESET requests.
//! Contains no controller logic of its own.

use dotenv::dotenv;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;

fn read_trimmed_line(input: &mut impl BufRead) -> eyre::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Truncates to at most `max` characters. `String::truncate` takes a byte
/// index and panics off a char boundary, so multibyte input is cut per
/// character here.
fn truncate_chars(text: &mut String, max: usize) {
    if let Some((index, _)) = text.char_indices().nth(max) {
        text.truncate(index);
    }
}

fn request(
    stream: &mut UnixStream,
    reader: &mut BufReader<UnixStream>,
    line: &str,
) -> eyre::Result<String> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    let mut response = String::new();
    reader.read_line(&mut response)?;
    Ok(response.trim_end().to_string())
}

fn main() -> eyre::Result<()> {
    dotenv().ok();

    let socket_path =
        std::env::var("SECLOCK_SOCKET").unwrap_or_else(|_| "/run/seclock.sock".to_string());

    let mut stream = UnixStream::connect(&socket_path)
        .map_err(|e| eyre::eyre!("Failed to connect to {socket_path}: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let stdin = std::io::stdin();
    let mut stdin = stdin.lock();

    loop {
        println!();
        println!("Security System Menu:");
        println!("1. Set Password");
        println!("2. Reset Password");
        println!("3. Exit");
        print!("Enter your choice: ");
        std::io::stdout().flush()?;

        let choice = read_trimmed_line(&mut stdin)?;
        match choice.as_str() {
            "1" => {
                print!("Enter new password (max 4 characters, 0-9 A B C D): ");
                std::io::stdout().flush()?;
                let mut password = read_trimmed_line(&mut stdin)?;
                truncate_chars(&mut password, 4);

                let response = request(&mut stream, &mut reader, &format!("SET {password}"))?;
                if response == "OK" {
                    println!("Password set successfully.");
                } else {
                    println!("Failed to set password: {response}");
                }
            }
            "2" => {
                let response = request(&mut stream, &mut reader, "RESET")?;
                if response == "OK" {
                    println!("Password reset successfully.");
                } else {
                    println!("Failed to reset password: {response}");
                }
            }
            "3" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => {
                println!("Invalid choice. Please try again.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_input_is_cut_to_four_characters() {
        let mut password = String::from("123456");
        truncate_chars(&mut password, 4);
        assert_eq!(password, "1234");
    }

    #[test]
    fn short_input_is_left_alone() {
        let mut password = String::from("12");
        truncate_chars(&mut password, 4);
        assert_eq!(password, "12");
    }

    #[test]
    fn multibyte_input_is_cut_per_character() {
        // Each of these is three bytes in UTF-8; a byte-index truncate
        // would land mid-character and panic.
        let mut password = String::from("あいうえお");
        truncate_chars(&mut password, 4);
        assert_eq!(password, "あいうえ");
    }
}
