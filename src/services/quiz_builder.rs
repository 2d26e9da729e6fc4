use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::Game;
use crate::db::types::Difficulty;
use crate::repositories::{games, questions, topic_counts};
use crate::services::option_shuffle::{seeded_rng, shuffled_options};
use crate::services::question_source::SynthesizedQuiz;

#[derive(Debug)]
pub(crate) struct PersistedQuiz {
    pub(crate) game: Game,
    pub(crate) question_count: u64,
    pub(crate) topic_count: i32,
}

/// Writes the game, its questions (options shuffled with `seed`) and the topic counter in
/// one transaction. Nothing is stored if any statement fails.
pub(crate) async fn persist_quiz(
    pool: &PgPool,
    user_id: &str,
    difficulty: Difficulty,
    quiz: SynthesizedQuiz,
    seed: u64,
) -> Result<PersistedQuiz> {
    let now = primitive_now_utc();
    let game_id = Uuid::new_v4().to_string();

    let mut rng = seeded_rng(seed);
    let rows: Vec<questions::NewQuestion> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(position, question)| questions::NewQuestion {
            id: Uuid::new_v4().to_string(),
            position: position as i32,
            question: question.question.clone(),
            answer: question.answer.clone(),
            options: shuffled_options(question, &mut rng),
        })
        .collect();

    let mut tx = pool.begin().await.context("Failed to begin quiz transaction")?;

    let game = games::create(
        &mut *tx,
        games::CreateGame {
            id: &game_id,
            user_id,
            topic: &quiz.topic_summary,
            difficulty,
            time_started: now,
        },
    )
    .await
    .context("Failed to create game")?;

    let question_count = questions::insert_many(&mut *tx, &game.id, rows, now)
        .await
        .context("Failed to insert questions")?;

    let topic_count = topic_counts::increment(&mut *tx, &quiz.topic_summary)
        .await
        .context("Failed to update topic count")?;

    tx.commit().await.context("Failed to commit quiz transaction")?;

    tracing::debug!(game_id = %game.id, seed, "Quiz persisted");

    Ok(PersistedQuiz { game, question_count, topic_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::questions::GeneratedQuestion;
    use crate::test_support;

    fn quiz(topic: &str) -> SynthesizedQuiz {
        SynthesizedQuiz {
            topic_summary: topic.to_string(),
            questions: (0..5)
                .map(|i| GeneratedQuestion {
                    question: format!("Question {i}?"),
                    answer: format!("right {i}"),
                    option1: format!("wrong a{i}"),
                    option2: format!("wrong b{i}"),
                    option3: format!("wrong c{i}"),
                })
                .collect(),
        }
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn same_seed_stores_same_option_order() {
        let ctx = test_support::setup_test_context().await;
        let user = test_support::insert_user(ctx.state.db(), "olga", "Olga", "olga-pass").await;

        let first = persist_quiz(ctx.state.db(), &user.id, Difficulty::Easy, quiz("Rivers"), 42)
            .await
            .expect("first quiz");
        let second = persist_quiz(ctx.state.db(), &user.id, Difficulty::Easy, quiz("Rivers"), 42)
            .await
            .expect("second quiz");

        assert_eq!(first.question_count, 5);
        assert_eq!(first.topic_count, 1);
        assert_eq!(second.topic_count, 2);

        let first_rows = questions::list_by_game(ctx.state.db(), &first.game.id).await.expect("rows");
        let second_rows =
            questions::list_by_game(ctx.state.db(), &second.game.id).await.expect("rows");
        let orders = |rows: &[crate::db::models::Question]| {
            rows.iter().map(|row| row.options.0.clone()).collect::<Vec<_>>()
        };
        assert_eq!(orders(&first_rows), orders(&second_rows));
    }
}
