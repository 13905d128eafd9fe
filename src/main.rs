// Terminal driver for the sorting ceremony:
// login/register, answer the quiz, get classified, house saved to profile

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::io::{self, Write};

use sorting_hat::{
    score_houses, static_questions, validate_registration, Credentials, GeminiClient,
    QuizQuestion, QuizSubmission, RegistrationRequest, SessionManager, SortingEngine, UserRecord,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let db_path = env::var("SORTING_HAT_DB").unwrap_or_else(|_| "sorting_hat.db".to_string());
    let mut sessions = SessionManager::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path))?;

    if args.len() > 1 && args[1] == "logout" {
        sessions.logout()?;
        println!("👋 Logged out.");
        return Ok(());
    }

    let generated = args.len() > 1 && args[1] == "generate";

    println!("🎩 Sorting Hat 2.0 — v{}", sorting_hat::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let user = sign_in(&mut sessions)?;
    println!("\n✨ Welcome, {}!", user.username);

    if let Some(house) = user.house {
        println!("   (The hat remembers: you were sorted into {} {})", house, house.crest());
    }

    let questions = if generated {
        fetch_generated_questions()
    } else {
        static_questions()
    };

    run_ceremony(&mut sessions, &questions, generated)?;

    Ok(())
}

// ============================================================================
// SIGN IN
// ============================================================================

fn sign_in(sessions: &mut SessionManager) -> Result<UserRecord> {
    if let Some(user) = sessions.current_user() {
        return Ok(user.clone());
    }

    loop {
        let choice = prompt("Sign in: [l]ogin or [r]egister? ")?;

        match choice.trim() {
            "l" | "login" => {
                let email = prompt("Email: ")?;
                let password = prompt("Password: ")?;

                match sessions.login(&Credentials { email, password }) {
                    Ok(user) => return Ok(user),
                    Err(err) => println!("❌ {}", err),
                }
            }
            "r" | "register" => {
                let username = prompt("Username: ")?;
                let email = prompt("Email: ")?;
                let password = prompt("Password: ")?;

                let request = RegistrationRequest {
                    username,
                    email,
                    password,
                };

                if let Err(errors) = validate_registration(&request) {
                    for err in errors {
                        println!("❌ {}", err);
                    }
                    continue;
                }

                match sessions.register(&request) {
                    Ok(user) => return Ok(user),
                    Err(err) => println!("❌ {}", err),
                }
            }
            _ => println!("Please answer 'l' or 'r'."),
        }
    }
}

// ============================================================================
// QUESTION SOURCE
// ============================================================================

/// Remote path with explicit fallback: any failure yields the static list
fn fetch_generated_questions() -> Vec<QuizQuestion> {
    println!("\n🔮 Conjuring fresh questions from the ether...");

    let result = GeminiClient::from_env().and_then(|client| client.generate_questions(None));

    match result {
        Ok(generated) => {
            println!("✓ Generated {} questions", generated.questions.len());
            generated.questions
        }
        Err(err) => {
            println!("⚠️  Generation failed ({}). Falling back to the classic ceremony.", err);
            static_questions()
        }
    }
}

// ============================================================================
// THE CEREMONY
// ============================================================================

fn run_ceremony(
    sessions: &mut SessionManager,
    questions: &[QuizQuestion],
    generated: bool,
) -> Result<()> {
    println!("\n📜 The Sorting Ceremony");
    println!("Answer the questions (1-4, or Enter to skip):\n");

    let mut answers: HashMap<String, String> = HashMap::new();

    for question in questions {
        println!("{}", question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let input = prompt("> ")?;
        if let Some(option) = input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| question.options.get(n.checked_sub(1)?))
        {
            answers.insert(question.id.clone(), option.clone());
        }
        println!();
    }

    println!("Describe your personality in a sentence or two (optional):");
    let personality_text = prompt("> ")?;

    let submission = QuizSubmission::new(answers, &personality_text);
    let mut engine = SortingEngine::new();

    // Generated questions carry per-house hint weights; fold those in
    let result = if generated {
        let hint_scores = score_houses(&submission.answers, questions);
        let mut base = sorting_hat::keyword_scores(&submission);
        for (house, total) in hint_scores.totals() {
            base.add(house, total);
        }
        engine.classify_scored(base)
    } else {
        engine.classify(&submission)
    };

    println!("\n🎩 The hat deliberates...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("\n{} {}!", result.house.crest(), result.house);
    println!("\n\"{}\"", result.house.motto());
    println!("\n{}\n", result.description);

    let user_id = sessions
        .current_user()
        .map(|u| u.id.clone())
        .context("Session vanished during the ceremony")?;
    sessions.update_user_house(&user_id, result.house)?;
    println!("💾 Your house has been recorded on your profile.");

    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
