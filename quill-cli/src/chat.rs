use std::io::Write;

use anyhow::Result;

use quill_agent::Conversation;

/// Run the interactive loop until the user quits or stdin closes.
///
/// Each turn reads one line, submits it, and prints every display string
/// the turn produced. A failed turn is reported and the loop keeps going
/// with the history intact.
pub async fn run(conversation: &mut Conversation) -> Result<()> {
    loop {
        print!("Chat with AI (q to quit): ");
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("\nError reading input: {e}\n");
                break;
            }
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if is_quit(line) {
            break;
        }

        match conversation.submit(line).await {
            Ok(outputs) => {
                for output in &outputs {
                    println!("{output}");
                }
            }
            Err(e) => {
                eprintln!("\nError: {e}\n");
            }
        }
    }

    Ok(())
}

/// A lone `q`, in either case, ends the session.
fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("q")
}
