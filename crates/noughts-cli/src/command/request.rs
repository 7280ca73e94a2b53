use std::process::ExitCode;

use noughts_service::Controller;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Nine characters from `x`, `o` and `b`, row by row
    board_state: String,
    /// Model variant, `1` to `7`
    model_variant: String,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Model variant, `1` to `7`
    model_variant: String,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TestArg {
    /// Model variant, `1` to `7`
    model_variant: String,
}

pub(crate) fn run_predict(controller: &Controller, arg: &PredictArg) -> anyhow::Result<ExitCode> {
    let PredictArg {
        board_state,
        model_variant,
    } = arg;
    util::print_response(&controller.predict_response(board_state, model_variant))
}

pub(crate) fn run_train(controller: &Controller, arg: &TrainArg) -> anyhow::Result<ExitCode> {
    util::print_response(&controller.train_response(&arg.model_variant))
}

pub(crate) fn run_test(controller: &Controller, arg: &TestArg) -> anyhow::Result<ExitCode> {
    util::print_response(&controller.test_response(&arg.model_variant))
}
