//! services/app/src/bin/app.rs
//!
//! The terminal front-end. It owns no logic of its own: every action is a
//! call into the session services, standing in for the web view layer.

use app_lib::{
    adapters::{
        JsonFileStore, OpenAiExerciseAdapter, OpenAiGradingAdapter, OpenAiTranslationAdapter,
        OpenAiTutorAdapter, TokioClock,
    },
    catalog::seed_catalog,
    config::Config,
    error::AppError,
    session::{
        next_exercise, start_practice, submit_answer, AppState, AuthService, ForumBoard, Gateway,
        PracticeSession, SubmitOutcome, TutorLog,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use bridge_ed_core::domain::{
    ChatRole, Course, ExerciseKind, Language, Region, SubscriptionTier, User,
};
use chrono::NaiveDate;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting BridgeEd...");

    // --- 2. Open the Local Store ---
    let store = Arc::new(JsonFileStore::new(&config.storage_path));
    let clock = Arc::new(TokioClock);

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| AppError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let exercise_adapter = Arc::new(OpenAiExerciseAdapter::new(
        openai_client.clone(),
        config.exercise_model.clone(),
    ));
    let grading_adapter = Arc::new(OpenAiGradingAdapter::new(
        openai_client.clone(),
        config.grading_model.clone(),
    ));
    let tutor_adapter = Arc::new(OpenAiTutorAdapter::new(
        openai_client.clone(),
        config.tutor_model.clone(),
    ));
    let translation_adapter = Arc::new(OpenAiTranslationAdapter::new(
        openai_client,
        config.translation_model.clone(),
    ));

    // --- 4. Build the Shared AppState and Session Services ---
    let app_state = AppState {
        config: config.clone(),
        store: store.clone(),
        clock: clock.clone(),
        exercise_adapter,
        grading_adapter,
        tutor_adapter,
        translation_adapter,
    };
    let auth = AuthService::new(store, clock.clone());
    let gateway = Gateway::from_state(&app_state);
    let catalog = seed_catalog();
    let mut board = ForumBoard::seeded(clock.as_ref());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut lang = config.default_language;
    let mut region = Region::West;
    let mut tutor_log = TutorLog::open(app_state.store.clone(), clock.clone(), lang).await?;

    // --- 5. Restore or Establish a Session ---
    let mut user = match auth.restore().await? {
        Some(user) => {
            println!("Welcome back, {}.", user.name);
            user
        }
        None => sign_in_flow(&auth, &mut lines).await?,
    };

    println!("Type 'help' for commands.");
    loop {
        let Some(line) = prompt(&mut lines, "> ").await? else {
            break;
        };
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        let result = match command {
            "" => Ok(()),
            "help" => {
                print_help();
                Ok(())
            }
            "courses" => {
                list_courses(&catalog.browse(region), &user, lang);
                Ok(())
            }
            "mine" => {
                list_courses(&catalog.enrolled(&user), &user, lang);
                Ok(())
            }
            "search" => {
                list_courses(&catalog.search(region, lang, &rest.join(" ")), &user, lang);
                Ok(())
            }
            "enroll" => match rest.first() {
                Some(id) if catalog.get(id).is_some() => {
                    auth.enroll(id).await.map(|u| user = u)
                }
                Some(id) => {
                    println!("No course '{id}' in the catalog.");
                    Ok(())
                }
                None => {
                    println!("Usage: enroll <course-id>");
                    Ok(())
                }
            },
            "drop" => match rest.first() {
                Some(id) => auth.unenroll(id).await.map(|u| user = u),
                None => {
                    println!("Usage: drop <course-id>");
                    Ok(())
                }
            },
            "due" => match (rest.first(), rest.get(1)) {
                (Some(id), Some(date)) => match date.parse::<NaiveDate>() {
                    Ok(date) => auth.set_due_date(id, date).await.map(|u| user = u),
                    Err(e) => {
                        println!("Invalid date: {e}");
                        Ok(())
                    }
                },
                _ => {
                    println!("Usage: due <course-id> <yyyy-mm-dd>");
                    Ok(())
                }
            },
            "practice" => match rest.first().and_then(|id| catalog.get(id)) {
                Some(course) => {
                    practice_flow(course, &user, lang, &gateway, &auth, &mut lines)
                        .await
                        .map(|updated| {
                            if let Some(updated) = updated {
                                user = updated;
                            }
                        })
                }
                None => {
                    println!("Usage: practice <course-id>");
                    Ok(())
                }
            },
            "chat" => chat_flow(&mut tutor_log, &app_state, &mut lines).await,
            "forum" => {
                forum_flow(&mut board, lang, &app_state).await
            }
            "health" => {
                for svc in gateway.health() {
                    println!("{:<12} {:?} {}ms", svc.name, svc.status, svc.latency_ms);
                }
                Ok(())
            }
            "lang" => match rest.first().and_then(|code| code.parse::<Language>().ok()) {
                Some(new_lang) => {
                    lang = new_lang;
                    tutor_log.load_for_language(lang).await?;
                    println!("Language switched to {lang}.");
                    Ok(())
                }
                None => {
                    println!("Usage: lang <en|fr|ar>");
                    Ok(())
                }
            },
            "region" => match rest.first() {
                Some(&"west") => {
                    region = Region::West;
                    Ok(())
                }
                Some(&"arab") => {
                    region = Region::Arab;
                    Ok(())
                }
                _ => {
                    println!("Usage: region <west|arab>");
                    Ok(())
                }
            },
            "stats" => {
                print_stats(&user);
                Ok(())
            }
            "logout" => {
                auth.sign_out().await?;
                println!("Signed out.");
                user = sign_in_flow(&auth, &mut lines).await?;
                Ok(())
            }
            "quit" | "exit" => break,
            other => {
                println!("Unknown command '{other}'. Type 'help'.");
                Ok(())
            }
        };

        // Nothing is fatal: report and keep the prior state.
        if let Err(e) = result {
            println!("Error: {e}");
        }
    }

    println!("Goodbye.");
    Ok(())
}

//=========================================================================================
// Interaction Flows
//=========================================================================================

async fn sign_in_flow(
    auth: &AuthService,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<User, AppError> {
    loop {
        let Some(choice) = prompt(lines, "(1) sign in  (2) sign up: ").await? else {
            return Err(AppError::Internal("stdin closed during sign-in".to_string()));
        };
        let Some(email) = prompt(lines, "email: ").await? else {
            continue;
        };
        match choice.trim() {
            "2" => {
                let Some(name) = prompt(lines, "name: ").await? else {
                    continue;
                };
                let Some(tier_raw) = prompt(lines, "tier (free/student/pro): ").await? else {
                    continue;
                };
                let tier = match tier_raw.trim() {
                    "student" => SubscriptionTier::Student,
                    "pro" => SubscriptionTier::Pro,
                    _ => SubscriptionTier::Free,
                };
                let user = auth.sign_up(email.trim(), name.trim(), tier).await?;
                println!("Account created. Welcome, {}.", user.name);
                return Ok(user);
            }
            _ => {
                let Some(password) = prompt(lines, "password: ").await? else {
                    continue;
                };
                let user = auth.sign_in(email.trim(), password.trim()).await?;
                println!("Signed in as {}.", user.name);
                return Ok(user);
            }
        }
    }
}

/// Runs one practice session to completion. Returns the updated user when a
/// correct answer advanced the course progress.
async fn practice_flow(
    course: &Course,
    user: &User,
    lang: Language,
    gateway: &Gateway,
    auth: &AuthService,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<User>, AppError> {
    let handle = match PracticeSession::begin(user, course, lang) {
        Ok(handle) => handle,
        Err(e) => {
            println!("{e}");
            return Ok(None);
        }
    };

    let mut updated_user = None;
    if let Err(e) = start_practice(&handle, gateway, course).await {
        println!("Could not fetch an exercise: {e}");
        return Ok(None);
    }

    loop {
        {
            let session = handle.lock().await;
            let Some(exercise) = session.exercise() else {
                break;
            };
            println!("\nQ: {}", exercise.question);
            if exercise.kind == ExerciseKind::MultipleChoice {
                for (i, option) in exercise.options.iter().flatten().enumerate() {
                    println!("  {}. {}", i + 1, option);
                }
            }
        }

        let Some(answer) = prompt(lines, "answer (empty to leave): ").await? else {
            break;
        };
        if answer.trim().is_empty() {
            handle.lock().await.invalidate();
            break;
        }
        handle.lock().await.set_answer(answer.trim());

        match submit_answer(&handle, gateway).await {
            Ok(SubmitOutcome::Graded { advance }) => {
                {
                    let session = handle.lock().await;
                    if let Some(result) = session.result() {
                        println!("\nScore: {}%", result.score);
                        println!("{}", result.feedback);
                        if let Some(meta) = &result.metadata {
                            println!("(latency {}ms, ~{} tokens)", meta.processing_ms, meta.tokens);
                        }
                    }
                }
                if advance {
                    let score = handle
                        .lock()
                        .await
                        .result()
                        .map(|r| r.score)
                        .unwrap_or_default();
                    updated_user = Some(auth.record_practice_result(&course.id, score).await?);
                    println!("Progress advanced!");
                }
            }
            Ok(SubmitOutcome::Discarded) => break,
            Err(e) => {
                println!("Grading failed, your answer is preserved: {e}");
                continue;
            }
        }

        let Some(again) = prompt(lines, "next exercise? (y/n): ").await? else {
            break;
        };
        if !again.trim().eq_ignore_ascii_case("y") {
            break;
        }
        if let Err(e) = next_exercise(&handle, gateway, course).await {
            println!("Could not fetch the next exercise: {e}");
            break;
        }
    }

    Ok(updated_user)
}

async fn chat_flow(
    tutor_log: &mut TutorLog,
    state: &AppState,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), AppError> {
    println!("Tutor chat ({} turns so far). '/back' to leave, '/clear' to wipe.",
        tutor_log.messages().len());
    loop {
        let Some(text) = prompt(lines, "you: ").await? else {
            return Ok(());
        };
        match text.trim() {
            "" => continue,
            "/back" => return Ok(()),
            "/clear" => {
                let Some(confirm) = prompt(lines, "clear this conversation? (y/n): ").await? else {
                    return Ok(());
                };
                if confirm.trim().eq_ignore_ascii_case("y") {
                    tutor_log.clear().await?;
                    println!("Conversation cleared.");
                }
            }
            message => {
                tutor_log.append(ChatRole::User, message).await?;
                match tutor_log.request_reply(state.tutor_adapter.as_ref()).await {
                    Ok(reply) => println!("tutor: {}", reply.text),
                    Err(e) => println!("The tutor is unavailable, resend to retry: {e}"),
                }
            }
        }
    }
}

async fn forum_flow(
    board: &mut ForumBoard,
    lang: Language,
    state: &AppState,
) -> Result<(), AppError> {
    // Posts foreign to the active language are shown with a translation.
    let snapshots: Vec<(String, String, String, Language)> = board
        .posts()
        .iter()
        .map(|p| (p.id.clone(), p.author.clone(), p.content.clone(), p.language))
        .collect();
    for (id, author, content, language) in snapshots {
        println!("\n[{author}] {content}");
        if language != lang {
            match board
                .translate_post(&id, lang, state.translation_adapter.as_ref())
                .await
            {
                Ok(translated) => println!("  ({lang}) {translated}"),
                Err(e) => println!("  (translation unavailable: {e})"),
            }
        }
    }
    Ok(())
}

//=========================================================================================
// Terminal Helpers
//=========================================================================================

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    text: &str,
) -> Result<Option<String>, AppError> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn list_courses(courses: &[&Course], user: &User, lang: Language) {
    if courses.is_empty() {
        println!("Nothing here yet.");
        return;
    }
    for course in courses {
        let marker = match user.enrollment(&course.id) {
            Some(enrollment) => format!("[{}%]", enrollment.progress),
            None => "[ ]".to_string(),
        };
        println!(
            "{marker:>6} {:<22} {:?}/{:?} {:>4}  {}",
            course.id,
            course.category,
            course.difficulty,
            course.duration,
            course.title.get(lang),
        );
    }
}

fn print_stats(user: &User) {
    println!(
        "{} ({:?}) - completed: {}, avg score: {:.1}, xp: {}, streak: {}",
        user.name,
        user.tier,
        user.stats.courses_completed,
        user.stats.avg_score,
        user.stats.total_xp,
        user.stats.streak,
    );
}

fn print_help() {
    println!(
        "courses | mine | search <text> | enroll <id> | drop <id> | due <id> <date>\n\
         practice <id> | chat | forum | health | stats | lang <en|fr|ar> | region <west|arab>\n\
         logout | quit"
    );
}
