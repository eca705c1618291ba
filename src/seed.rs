//! 数据填充
//!
//! 先在内存中生成一份随机数据计划，再在单个事务里清空并写入 games 数据库。
//! 给定随机种子时同一份计划可以复现。

use std::collections::HashSet;

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};

use crate::database::dto::{InsertGameData, InsertReviewData, InsertUserData, SCORE_RANGE};
use crate::database::repository::{
    games_repository::GamesRepository, reviews_repository::ReviewsRepository,
    users_repository::UsersRepository,
};

pub const GENRES: &[&str] = &[
    "Platformer",
    "Shooter",
    "Fighting",
    "Stealth",
    "Survival",
    "Rhythm",
    "Survival Horror",
    "Metroidvania",
    "Text-Based",
    "Visual Novel",
    "Tile-Matching",
    "Puzzle",
    "Action RPG",
    "MMORPG",
    "Tactical RPG",
    "JRPG",
    "Life Simulator",
    "Vehicle Simulator",
    "Tower Defense",
    "Turn-Based Strategy",
    "Racing",
    "Sports",
    "Party",
    "Trivia",
    "Sandbox",
];

pub const PLATFORMS: &[&str] = &[
    "NES",
    "SNES",
    "Nintendo 64",
    "GameCube",
    "Wii",
    "Wii U",
    "Nintendo Switch",
    "GameBoy",
    "GameBoy Advance",
    "Nintendo DS",
    "Nintendo 3DS",
    "XBox",
    "XBox 360",
    "XBox One",
    "XBox Series X/S",
    "PlayStation",
    "PlayStation 2",
    "PlayStation 3",
    "PlayStation 4",
    "PlayStation 5",
    "PSP",
    "PS Vita",
    "Genesis",
    "DreamCast",
    "PC",
];

pub const PRICE_RANGE: std::ops::RangeInclusive<i32> = 5..=60;

/// 游戏标题与评论的词数范围
const TITLE_WORDS: std::ops::Range<usize> = 2..5;
const COMMENT_WORDS: std::ops::Range<usize> = 4..12;

/// 同一标题最多重抽几次，之后追加序号保证唯一
const TITLE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    pub users: usize,
    pub games: usize,
    pub max_reviews_per_user: u32,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            users: 100,
            games: 100,
            max_reviews_per_user: 10,
        }
    }
}

/// 计划中的评测，用下标引用计划中的游戏和用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReview {
    pub score: i32,
    pub comment: String,
    pub game: usize,
    pub user: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub users: Vec<InsertUserData>,
    pub games: Vec<InsertGameData>,
    pub reviews: Vec<PlannedReview>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub games: usize,
    pub reviews: usize,
}

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// 生成随机数据计划；没有游戏时不生成评测
pub fn plan<R: Rng + ?Sized>(options: &SeedOptions, rng: &mut R) -> SeedPlan {
    let users = (0..options.users)
        .map(|_| InsertUserData {
            name: Name().fake_with_rng(rng),
        })
        .collect();

    let mut titles = HashSet::with_capacity(options.games);
    let games = (0..options.games)
        .map(|index| InsertGameData {
            title: unique_title(&mut titles, index, rng),
            genre: pick(GENRES, rng).to_string(),
            platform: pick(PLATFORMS, rng).to_string(),
            price: rng.gen_range(PRICE_RANGE),
        })
        .collect();

    let mut reviews = Vec::new();
    if options.games > 0 {
        let max_reviews = options.max_reviews_per_user.max(1);
        for user in 0..options.users {
            for _ in 0..rng.gen_range(1..=max_reviews) {
                reviews.push(PlannedReview {
                    score: rng.gen_range(SCORE_RANGE),
                    comment: Sentence(COMMENT_WORDS).fake_with_rng(rng),
                    game: rng.gen_range(0..options.games),
                    user,
                });
            }
        }
    }

    SeedPlan {
        users,
        games,
        reviews,
    }
}

/// 在单个事务中清空 reviews、users、games 并写入计划
pub async fn apply(db: &DatabaseConnection, plan: SeedPlan) -> Result<SeedSummary, DbErr> {
    let txn = db.begin().await?;

    let deleted = ReviewsRepository::delete_all(&txn).await?.rows_affected;
    log::debug!("已删除 {} 条评测", deleted);
    let deleted = UsersRepository::delete_all(&txn).await?.rows_affected;
    log::debug!("已删除 {} 个用户", deleted);
    let deleted = GamesRepository::delete_all(&txn).await?.rows_affected;
    log::debug!("已删除 {} 个游戏", deleted);

    let mut user_ids = Vec::with_capacity(plan.users.len());
    for user in plan.users {
        user_ids.push(UsersRepository::insert(&txn, user).await?.id);
    }

    let mut game_ids = Vec::with_capacity(plan.games.len());
    for game in plan.games {
        game_ids.push(GamesRepository::insert(&txn, game).await?.id);
    }

    let review_count = plan.reviews.len();
    for review in plan.reviews {
        let (Some(game_id), Some(user_id)) =
            (game_ids.get(review.game), user_ids.get(review.user))
        else {
            return Err(DbErr::Custom(format!(
                "评测引用了计划外的下标: game {} / user {}",
                review.game, review.user
            )));
        };
        let data = InsertReviewData {
            score: review.score,
            comment: review.comment,
            game_id: *game_id,
            user_id: *user_id,
        };
        ReviewsRepository::insert(&txn, data).await?;
    }

    txn.commit().await?;

    Ok(SeedSummary {
        users: user_ids.len(),
        games: game_ids.len(),
        reviews: review_count,
    })
}

fn pick<R: Rng + ?Sized>(items: &[&'static str], rng: &mut R) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn unique_title<R: Rng + ?Sized>(
    taken: &mut HashSet<String>,
    index: usize,
    rng: &mut R,
) -> String {
    for _ in 0..TITLE_ATTEMPTS {
        let title = random_title(rng);
        if taken.insert(title.clone()) {
            return title;
        }
    }

    let title = format!("{} #{}", random_title(rng), index + 1);
    taken.insert(title.clone());
    title
}

fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    let sentence: String = Sentence(TITLE_WORDS).fake_with_rng(rng);
    sentence.trim_end_matches('.').to_string()
}
