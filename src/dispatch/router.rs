//! Tool Router：Intent -> 处理分支
//!
//! 除 Unparsed 与 GetCreator 外，每个分支在返回前至少发出一条 TraceEvent。
//! 协作方（存储 / 搜索）失败不在此重试，由 RecoveryEngine 转为道歉文案；
//! 改写（restyle）调用失败时回退为未改写的文本。

use std::sync::Arc;

use chrono::Local;

use crate::config::DEFAULT_CREATOR;
use crate::core::{AgentError, RecoveryEngine, SessionContext};
use crate::dispatch::coach::{CoachAgent, CoachTips};
use crate::dispatch::evaluation::EvaluationAgent;
use crate::dispatch::personalize::personalize;
use crate::dispatch::summary::{format_summary, NO_WORKOUTS_REPLY};
use crate::intent::Intent;
use crate::llm::{prompts, BackendClient, BackendReply};
use crate::observability::{TraceEmitter, TraceId};
use crate::store::{NewEntry, SessionStore, Weight};
use crate::tools::TipSource;

/// Help 介绍的功能（不含自检）
pub const FEATURES: &[&str] = &[
    "Log a workout: exercise, sets, reps and weight",
    "Summarize your latest training session",
    "Remember your name",
    "Share coaching tips for any exercise",
];

pub struct ToolRouter {
    backend: Arc<BackendClient>,
    store: Arc<dyn SessionStore>,
    coach: Arc<CoachAgent>,
    evaluator: EvaluationAgent,
    tracer: TraceEmitter,
    recovery: RecoveryEngine,
    stylist: String,
    creator: String,
}

impl ToolRouter {
    pub fn new(
        backend: Arc<BackendClient>,
        store: Arc<dyn SessionStore>,
        tips: Arc<dyn TipSource>,
        max_tips: usize,
        tracer: TraceEmitter,
    ) -> Self {
        let coach = Arc::new(CoachAgent::new(backend.clone(), tips, max_tips));
        let evaluator = EvaluationAgent::new(store.clone(), coach.clone());
        let stylist = prompts::stylist_instructions(backend.persona());
        Self {
            backend,
            store,
            coach,
            evaluator,
            tracer,
            recovery: RecoveryEngine::new(),
            stylist,
            creator: DEFAULT_CREATOR.to_string(),
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// 分发一个意图；任何失败都转为回复文本
    pub async fn dispatch(&self, intent: Intent, ctx: &mut SessionContext) -> String {
        let tool = intent.tool_name();
        match intent {
            Intent::Unparsed { raw_text } => personalize(&raw_text, &ctx.identity),
            Intent::GetCreator => self.creator.clone(),
            intent => {
                let trace = self.tracer.start();
                tracing::info!(trace_id = %trace, tool, "dispatching intent");
                match self.handle(intent, ctx, trace).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        self.tracer.emit(trace, &format!("{tool}.failed"), e.to_string());
                        self.recovery.apology(&e)
                    }
                }
            }
        }
    }

    async fn handle(
        &self,
        intent: Intent,
        ctx: &mut SessionContext,
        trace: TraceId,
    ) -> Result<String, AgentError> {
        match intent {
            Intent::LogSession {
                exercise,
                sets,
                reps,
                weight,
            } => self.log_session(exercise, sets, reps, weight, trace).await,
            Intent::GetSummary => self.get_summary(ctx, trace).await,
            Intent::SetName { name } => {
                ctx.identity.set_name(&name);
                self.tracer.emit(trace, "set_name", format!("name={name}"));
                Ok(format!("Nice to meet you, {name}! I'll remember your name."))
            }
            Intent::GetName => Ok(self.get_name(ctx, trace)),
            Intent::CoachRequest { exercise } => self.coach_tips(&exercise, ctx, trace).await,
            Intent::EvaluateAgents => self.evaluate(ctx, trace).await,
            Intent::Help => {
                self.tracer.emit(trace, "help", "narrating feature list");
                let fallback = FEATURES
                    .iter()
                    .map(|f| format!("- {f}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let reply = self
                    .restyle(
                        prompts::help_request(FEATURES),
                        format!("Here's what I can do:\n{fallback}"),
                    )
                    .await;
                Ok(personalize(&reply, &ctx.identity))
            }
            Intent::Unparsed { raw_text } => Ok(personalize(&raw_text, &ctx.identity)),
            Intent::GetCreator => Ok(self.creator.clone()),
        }
    }

    async fn log_session(
        &self,
        exercise: String,
        sets: u32,
        reps: u32,
        weight: Weight,
        trace: TraceId,
    ) -> Result<String, AgentError> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        self.tracer.emit(
            trace,
            "log_session.request",
            format!("{exercise} {sets}x{reps} at {weight}kg on {today}"),
        );
        let entry = NewEntry {
            exercise,
            sets,
            reps,
            weight,
        };
        let receipt = self.store.append(&today, entry).await?;
        self.tracer
            .emit(trace, "log_session.stored", format!("id={}", receipt.id));
        Ok(format!("{} (ID: {})", receipt.message, receipt.id))
    }

    async fn get_summary(&self, ctx: &SessionContext, trace: TraceId) -> Result<String, AgentError> {
        self.tracer.emit(trace, "get_summary.request", "loading latest session");
        let Some(record) = self.store.latest_session().await? else {
            self.tracer.emit(trace, "get_summary.empty", "no sessions logged");
            return Ok(NO_WORKOUTS_REPLY.to_string());
        };

        let summary = format_summary(&record);
        self.tracer.emit(
            trace,
            "get_summary.formatted",
            format!("{} entries on {}", record.exercises.len(), record.date),
        );
        let reply = self
            .restyle(prompts::summary_restyle(&summary, ctx.user_name()), summary)
            .await;
        Ok(personalize(&reply, &ctx.identity))
    }

    fn get_name(&self, ctx: &SessionContext, trace: TraceId) -> String {
        match ctx.user_name() {
            Some(name) => {
                self.tracer.emit(trace, "get_name", "known");
                personalize(name, &ctx.identity)
            }
            None => {
                self.tracer.emit(trace, "get_name", "unknown");
                "I don't know your name yet. Tell me by saying \"my name is ...\"".to_string()
            }
        }
    }

    async fn coach_tips(
        &self,
        exercise: &str,
        ctx: &SessionContext,
        trace: TraceId,
    ) -> Result<String, AgentError> {
        self.tracer.emit(trace, "coach.request", format!("exercise={exercise}"));
        let Some(query) = self.coach.search_query(exercise).await? else {
            self.tracer
                .emit(trace, "coach.decode_failed", "stage one reply was not a search_web call");
            return Err(AgentError::JsonParseError(format!(
                "coach reply for {exercise} is not a search_web call"
            )));
        };
        self.tracer.emit(trace, "coach.query", format!("query={query}"));

        match self.coach.fetch_tips(exercise, &query).await? {
            CoachTips::NoResults => {
                self.tracer.emit(trace, "coach.no_results", "tip source returned nothing");
                Ok(format!("No tips found for {exercise}."))
            }
            CoachTips::Found(raw) => {
                self.tracer.emit(trace, "coach.results", "formatting tips");
                let reply = self.restyle(prompts::tips_restyle(exercise, &raw), raw).await;
                Ok(personalize(&reply, &ctx.identity))
            }
        }
    }

    async fn evaluate(&self, ctx: &SessionContext, trace: TraceId) -> Result<String, AgentError> {
        self.tracer.emit(trace, "evaluate.start", "running self-checks");
        let report = self.evaluator.run_all().await;
        self.tracer
            .emit(trace, "evaluate.done", report.to_string().replace('\n', "; "));
        let fallback = format!("Evaluation results:\n{report}");
        let reply = self
            .restyle(prompts::evaluation_narration(&report.to_string()), fallback)
            .await;
        Ok(personalize(&reply, &ctx.identity))
    }

    /// 让后端改写文本；重试耗尽、致命错误或空回复时回退为 fallback
    async fn restyle(&self, request: String, fallback: String) -> String {
        match self.backend.ask_with(&self.stylist, &request, &[]).await {
            Ok(BackendReply::Text(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("restyle unavailable, using plain text");
                fallback
            }
            Err(e) => {
                tracing::warn!(error = %e, "restyle failed, using plain text");
                fallback
            }
        }
    }
}
