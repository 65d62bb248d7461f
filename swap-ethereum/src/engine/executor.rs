use alloy::primitives::U256;
use chrono::Utc;
use swap_common::{
    models::{
        quote::Quote,
        swap::{
            ContractCall, QuoteSummary, SwapFailure, SwapRequest, SwapResult, SwapState, TxReceipt,
        },
        Asset,
    },
    traits::{ChainReader, TransactionSubmitter},
    SwapError,
};
use tracing::{info, instrument, warn};

use super::{chain_read, AllowanceManager, QuoteResolver};
use crate::{config::ChainConfig, router};

fn stop(state: SwapState, source: SwapError) -> SwapFailure {
    warn!(%state, error = %source, "Swap stopped");
    SwapFailure::new(state, source)
}

fn check_deadline(request: &SwapRequest) -> Result<(), SwapError> {
    let now = Utc::now();
    if request.deadline <= now {
        return Err(SwapError::DeadlineExpired { deadline: request.deadline, now });
    }
    Ok(())
}

/// Runs swap requests against a single chain.
///
/// A request moves through `QUOTING -> ALLOWANCE_CHECK -> SUBMITTING -> PENDING` and ends in
/// `CONFIRMED` or in one of the failure states of [`SwapState`]. Nothing is retried: once a
/// request stopped, a new request has to be made.
pub struct SwapExecutor<R, S> {
    config: ChainConfig,
    reader: R,
    submitter: S,
}

impl<R: ChainReader, S: TransactionSubmitter> SwapExecutor<R, S> {
    pub fn new(config: ChainConfig, reader: R, submitter: S) -> Self {
        Self { config, reader, submitter }
    }

    /// Checks what can be checked without touching the network.
    fn validate(&self, request: &SwapRequest) -> Result<(), SwapFailure> {
        check_deadline(request).map_err(|e| stop(SwapState::Expired, e))?;

        let signer = self.submitter.sender();
        if request.account != signer {
            return Err(stop(
                SwapState::Rejected,
                SwapError::SignerMismatch { requested: request.account, signer },
            ));
        }
        if request.native_input && request.path.input() != self.config.wrapped_native {
            return Err(stop(
                SwapState::Rejected,
                SwapError::InvalidPath(format!(
                    "native input swaps must start at the wrapped native token {}",
                    self.config.wrapped_native
                )),
            ));
        }
        Ok(())
    }

    async fn quote(&self, request: &SwapRequest) -> Result<Quote, SwapError> {
        let input = if request.native_input {
            Asset::Native
        } else {
            Asset::Erc20(request.path.input())
        };
        let token = self
            .reader
            .token(input)
            .await
            .map_err(chain_read)?;
        let amount_in = token.parse_amount(&request.amount_in)?;

        QuoteResolver::new(&self.reader, self.config.router)
            .resolve(&request.path, amount_in)
            .await
    }

    fn swap_call(&self, request: &SwapRequest, amount_in: U256, min_out: U256) -> ContractCall {
        // `check_deadline` guarantees the deadline lies in the future, so it is positive
        let deadline = U256::from(
            request
                .deadline
                .timestamp()
                .unsigned_abs(),
        );
        let path = request.path.tokens();
        if request.native_input {
            ContractCall::new(
                self.config.router,
                router::encode_swap_exact_eth_for_tokens(min_out, path, request.account, deadline),
            )
            .with_value(amount_in)
        } else {
            ContractCall::new(
                self.config.router,
                router::encode_swap_exact_tokens_for_tokens(
                    amount_in,
                    min_out,
                    path,
                    request.account,
                    deadline,
                ),
            )
        }
    }

    #[instrument(skip_all, fields(chain = %self.config.name, path = %request.path, account = %request.account))]
    pub async fn execute(&self, request: SwapRequest) -> Result<SwapResult, SwapFailure> {
        self.validate(&request)?;

        info!(state = %SwapState::Quoting, amount = %request.amount_in, "Quoting swap");
        let quote = self
            .quote(&request)
            .await
            .map_err(|e| stop(SwapState::QuoteFailed, e))?;
        let amount_in = quote.amount_in();
        let quoted_out = quote.amount_out();
        let min_out = request.slippage.min_output(quoted_out);
        let summary = QuoteSummary { amount_in, quoted_out, min_out };

        info!(
            state = %SwapState::AllowanceCheck,
            %amount_in,
            %quoted_out,
            %min_out,
            slippage = %request.slippage,
            "Quote resolved"
        );
        let approval: Option<TxReceipt> = if request.native_input {
            None
        } else {
            AllowanceManager::new(&self.reader, &self.submitter)
                .ensure_allowance(request.path.input(), self.config.router, amount_in)
                .await
                .map_err(|e| stop(SwapState::ApprovalFailed, e).with_quote(summary))?
        };

        info!(state = %SwapState::Submitting, "Submitting swap");
        check_deadline(&request)
            .map_err(|e| {
                stop(SwapState::Expired, e)
                    .with_quote(summary)
                    .with_approval(approval.clone())
            })?;
        let tx_hash = self
            .submitter
            .submit(self.swap_call(&request, amount_in, min_out))
            .await
            .map_err(|e| {
                stop(SwapState::SubmitFailed, SwapError::Submission(e.to_string()))
                    .with_quote(summary)
                    .with_approval(approval.clone())
            })?;

        info!(state = %SwapState::Pending, %tx_hash, "Waiting for swap receipt");
        let receipt = self
            .submitter
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| {
                stop(SwapState::Pending, chain_read(e))
                    .with_quote(summary)
                    .with_tx_hash(tx_hash)
                    .with_approval(approval.clone())
            })?;

        if !receipt.success {
            return Err(stop(
                SwapState::Reverted,
                SwapError::SlippageExceededOrRevert { min_out, receipt },
            )
            .with_quote(summary)
            .with_tx_hash(tx_hash)
            .with_approval(approval));
        }

        info!(
            state = %SwapState::Confirmed,
            %tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Swap confirmed"
        );
        Ok(SwapResult { amount_in, quoted_out, min_out, tx_hash, receipt, approval })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::{
        primitives::{Address, TxHash},
        sol_types::SolCall,
    };
    use chrono::{Duration, Utc};
    use swap_common::{
        models::{path::Path, token::Token},
        traits::{MockChainReader, MockTransactionSubmitter},
        ChainCallError, SlippageTolerance,
    };
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        erc20,
        router::{swapExactETHForTokensCall, swapExactTokensForTokensCall},
        test_fixtures::{mainnet_config, router, signer, usdc, usdt, weth},
    };

    const SWAP_HASH: TxHash = TxHash::repeat_byte(0xaa);
    const APPROVAL_HASH: TxHash = TxHash::repeat_byte(0xbb);

    fn e18(value: u64) -> U256 {
        U256::from(value) * U256::from(10u64).pow(U256::from(18))
    }

    fn request(path: Vec<Address>, amount_in: &str, slippage: f64) -> SwapRequest {
        SwapRequest {
            path: Path::new(path).unwrap(),
            amount_in: amount_in.to_string(),
            slippage: SlippageTolerance::from_percent(slippage).unwrap(),
            account: signer(),
            deadline: Utc::now() + Duration::minutes(20),
            native_input: false,
        }
    }

    fn receipt(tx_hash: TxHash, success: bool) -> TxReceipt {
        TxReceipt { tx_hash, block_number: 19_000_000, gas_used: 120_000, success }
    }

    /// 18 decimals tokens, quoted at `amounts`, with `allowance` already in place.
    fn reader(amounts: Vec<U256>, allowance: U256) -> MockChainReader {
        let mut reader = MockChainReader::new();
        reader
            .expect_token()
            .returning(|asset| Ok(Token::new(asset, "TKN", 18)));
        reader
            .expect_amounts_out()
            .times(1)
            .returning(move |_, _, _| Ok(amounts.clone()));
        reader
            .expect_allowance()
            .returning(move |_, _, _| Ok(allowance));
        reader
    }

    fn submitter() -> MockTransactionSubmitter {
        let mut submitter = MockTransactionSubmitter::new();
        submitter
            .expect_sender()
            .return_const(signer());
        submitter
    }

    fn executor(
        reader: MockChainReader,
        submitter: MockTransactionSubmitter,
    ) -> SwapExecutor<MockChainReader, MockTransactionSubmitter> {
        SwapExecutor::new(mainnet_config(), reader, submitter)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_swap_submits_exact_min_out() {
        // 9.98e18 * 9900 / 10000
        let expected_min_out = U256::from_str("9880200000000000000").unwrap();
        let quoted_out = U256::from_str("9980000000000000000").unwrap();
        let request = request(vec![usdt(), usdc()], "10", 1.0);
        let deadline = U256::from(request.deadline.timestamp().unsigned_abs());

        let reader = reader(vec![e18(10), quoted_out], e18(10));
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .times(1)
            .withf(move |call| {
                let swap = swapExactTokensForTokensCall::abi_decode(&call.data).unwrap();
                call.to == router() &&
                    call.value.is_zero() &&
                    swap.amountIn == e18(10) &&
                    swap.amountOutMin == expected_min_out &&
                    swap.path == vec![usdt(), usdc()] &&
                    swap.to == signer() &&
                    swap.deadline == deadline
            })
            .returning(|_| Ok(SWAP_HASH));
        submitter
            .expect_wait_for_receipt()
            .returning(|hash| Ok(receipt(hash, true)));

        let result = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap();

        assert_eq!(
            result,
            SwapResult {
                amount_in: e18(10),
                quoted_out,
                min_out: expected_min_out,
                tx_hash: SWAP_HASH,
                receipt: receipt(SWAP_HASH, true),
                approval: None,
            }
        );
        assert!(logs_contain("state=CONFIRMED"));
    }

    #[tokio::test]
    async fn test_swap_with_approval() {
        let reader = reader(vec![e18(10), e18(9)], U256::ZERO);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .withf(|call| call.to == usdt())
            .times(1)
            .returning(|call| {
                let approve = erc20::approveCall::abi_decode(&call.data).unwrap();
                assert_eq!(approve._spender, router());
                assert_eq!(approve._value, e18(10));
                Ok(APPROVAL_HASH)
            });
        submitter
            .expect_submit()
            .withf(|call| call.to == router())
            .times(1)
            .returning(|_| Ok(SWAP_HASH));
        submitter
            .expect_wait_for_receipt()
            .times(2)
            .returning(|hash| Ok(receipt(hash, true)));

        let result = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "10", 0.5))
            .await
            .unwrap();

        assert_eq!(result.approval, Some(receipt(APPROVAL_HASH, true)));
        assert_eq!(result.tx_hash, SWAP_HASH);
    }

    #[tokio::test]
    async fn test_zero_slippage_revert_is_reported() {
        let reader = reader(vec![U256::from(1_000), U256::from(1_000)], U256::MAX);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .withf(|call| {
                swapExactTokensForTokensCall::abi_decode(&call.data)
                    .unwrap()
                    .amountOutMin ==
                    U256::from(1_000)
            })
            .returning(|_| Ok(SWAP_HASH));
        // Execution yields 999 < minOut, the router reverts.
        submitter
            .expect_wait_for_receipt()
            .returning(|hash| Ok(receipt(hash, false)));

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "0.000000000000001", 0.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Reverted);
        assert_eq!(failure.tx_hash, Some(SWAP_HASH));
        assert_eq!(
            failure.source,
            SwapError::SlippageExceededOrRevert {
                min_out: U256::from(1_000),
                receipt: receipt(SWAP_HASH, false)
            }
        );
    }

    #[tokio::test]
    async fn test_expired_deadline_makes_no_calls() {
        let mut reader = MockChainReader::new();
        reader.expect_token().times(0);
        reader.expect_amounts_out().times(0);
        reader.expect_allowance().times(0);
        reader.expect_balance().times(0);
        let mut submitter = MockTransactionSubmitter::new();
        submitter.expect_sender().times(0);
        submitter.expect_submit().times(0);
        submitter
            .expect_wait_for_receipt()
            .times(0);

        let mut request = request(vec![usdt(), usdc()], "10", 1.0);
        request.deadline = Utc::now() - Duration::seconds(1);

        let failure = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Expired);
        assert!(matches!(failure.source, SwapError::DeadlineExpired { .. }));
        assert_eq!(failure.quote, None);
    }

    #[tokio::test]
    async fn test_missing_pool_never_checks_allowance() {
        let mut reader = MockChainReader::new();
        reader
            .expect_token()
            .returning(|asset| Ok(Token::new(asset, "TKN", 18)));
        reader
            .expect_amounts_out()
            .returning(|_, _, _| {
                Err(ChainCallError::Reverted(
                    "UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string(),
                ))
            });
        reader.expect_allowance().times(0);
        let mut submitter = submitter();
        submitter.expect_submit().times(0);

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), weth(), usdc()], "10", 1.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::QuoteFailed);
        assert!(matches!(failure.source, SwapError::NoLiquidity { .. }));
    }

    #[tokio::test]
    async fn test_failed_approval_never_submits_swap() {
        let reader = reader(vec![e18(10), e18(9)], U256::ZERO);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .times(1)
            .withf(|call| call.to == usdt())
            .returning(|_| Ok(APPROVAL_HASH));
        submitter
            .expect_wait_for_receipt()
            .times(1)
            .returning(|hash| Ok(receipt(hash, false)));

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "10", 1.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::ApprovalFailed);
        assert_eq!(failure.tx_hash, None);
        assert!(matches!(
            failure.source,
            SwapError::ApprovalFailed { tx_hash: Some(hash), .. } if hash == APPROVAL_HASH
        ));
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_approval() {
        let reader = reader(vec![e18(10), e18(9)], U256::ZERO);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .withf(|call| call.to == usdt())
            .returning(|_| Ok(APPROVAL_HASH));
        submitter
            .expect_submit()
            .withf(|call| call.to == router())
            .returning(|_| Err(ChainCallError::Transport("connection reset".to_string())));
        submitter
            .expect_wait_for_receipt()
            .returning(|hash| Ok(receipt(hash, true)));

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "10", 1.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::SubmitFailed);
        assert!(matches!(failure.source, SwapError::Submission(_)));
        assert_eq!(failure.approval, Some(receipt(APPROVAL_HASH, true)));
        assert_eq!(
            failure.quote,
            Some(QuoteSummary {
                amount_in: e18(10),
                quoted_out: e18(9),
                min_out: U256::from_str("8910000000000000000").unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_receipt_failure_carries_tx_hash() {
        let reader = reader(vec![e18(10), e18(9)], e18(10));
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .returning(|_| Ok(SWAP_HASH));
        submitter
            .expect_wait_for_receipt()
            .returning(|_| Err(ChainCallError::Transport("timeout".to_string())));

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "10", 1.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Pending);
        assert_eq!(failure.tx_hash, Some(SWAP_HASH));
        assert!(matches!(failure.source, SwapError::ChainRead(_)));
        // The swap may still be mined, the caller needs the minimum it was sent with
        assert_eq!(
            failure.quote,
            Some(QuoteSummary {
                amount_in: e18(10),
                quoted_out: e18(9),
                min_out: U256::from_str("8910000000000000000").unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_deadline_passing_during_approval_stops_before_submit() {
        let reader = reader(vec![e18(10), e18(9)], U256::ZERO);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .withf(|call| call.to == usdt())
            .times(1)
            .returning(|_| Ok(APPROVAL_HASH));
        submitter
            .expect_submit()
            .withf(|call| call.to == router())
            .times(0);
        submitter
            .expect_wait_for_receipt()
            .times(1)
            .returning(|hash| {
                // Approval gets mined after the deadline
                std::thread::sleep(std::time::Duration::from_millis(600));
                Ok(receipt(hash, true))
            });

        let mut request = request(vec![usdt(), usdc()], "10", 1.0);
        request.deadline = Utc::now() + Duration::milliseconds(300);

        let failure = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Expired);
        assert!(matches!(failure.source, SwapError::DeadlineExpired { .. }));
        assert_eq!(failure.approval, Some(receipt(APPROVAL_HASH, true)));
        assert_eq!(failure.tx_hash, None);
        assert!(failure.quote.is_some());
    }

    #[tokio::test]
    async fn test_min_out_never_exceeds_quote() {
        for slippage in [0.0, 0.01, 0.5, 3.0, 49.99, 100.0] {
            let quoted_out = U256::from(123_456_789u64);
            let reader = reader(vec![e18(1), quoted_out], U256::MAX);
            let mut submitter = submitter();
            submitter
                .expect_submit()
                .withf(move |call| {
                    swapExactTokensForTokensCall::abi_decode(&call.data)
                        .unwrap()
                        .amountOutMin <=
                        quoted_out
                })
                .times(1)
                .returning(|_| Ok(SWAP_HASH));
            submitter
                .expect_wait_for_receipt()
                .returning(|hash| Ok(receipt(hash, true)));

            let result = executor(reader, submitter)
                .execute(request(vec![usdt(), usdc()], "1", slippage))
                .await
                .unwrap();

            assert!(result.min_out <= result.quoted_out);
        }
    }

    #[tokio::test]
    async fn test_native_input_skips_allowance() {
        let mut reader = MockChainReader::new();
        reader
            .expect_token()
            .withf(|asset| *asset == Asset::Native)
            .returning(|_| Ok(Token::native("ETH")));
        reader
            .expect_amounts_out()
            .returning(|_, amount_in, _| Ok(vec![amount_in, U256::from(3_000_000_000u64)]));
        reader.expect_allowance().times(0);
        let mut submitter = submitter();
        submitter
            .expect_submit()
            .times(1)
            .withf(|call| {
                let swap = swapExactETHForTokensCall::abi_decode(&call.data).unwrap();
                call.to == router() &&
                    call.value == e18(1) &&
                    swap.path == vec![weth(), usdc()] &&
                    swap.amountOutMin == U256::from(2_970_000_000u64)
            })
            .returning(|_| Ok(SWAP_HASH));
        submitter
            .expect_wait_for_receipt()
            .returning(|hash| Ok(receipt(hash, true)));

        let mut request = request(vec![weth(), usdc()], "1", 1.0);
        request.native_input = true;

        let result = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap();

        assert_eq!(result.approval, None);
        assert_eq!(result.amount_in, e18(1));
    }

    #[tokio::test]
    async fn test_native_input_must_start_at_wrapped_native() {
        let mut reader = MockChainReader::new();
        reader.expect_token().times(0);
        let submitter = submitter();

        let mut request = request(vec![usdt(), usdc()], "1", 1.0);
        request.native_input = true;

        let failure = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Rejected);
        assert!(matches!(failure.source, SwapError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_foreign_account_is_rejected() {
        let mut reader = MockChainReader::new();
        reader.expect_token().times(0);
        let submitter = submitter();

        let mut request = request(vec![usdt(), usdc()], "1", 1.0);
        request.account = Address::repeat_byte(0x01);

        let failure = executor(reader, submitter)
            .execute(request)
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::Rejected);
        assert!(matches!(failure.source, SwapError::SignerMismatch { .. }));
    }

    #[tokio::test]
    async fn test_invalid_amount_fails_quoting() {
        let mut reader = MockChainReader::new();
        reader
            .expect_token()
            .returning(|asset| Ok(Token::new(asset, "USDT", 6)));
        reader.expect_amounts_out().times(0);
        let submitter = submitter();

        let failure = executor(reader, submitter)
            .execute(request(vec![usdt(), usdc()], "0.0000001", 1.0))
            .await
            .unwrap_err();

        assert_eq!(failure.state, SwapState::QuoteFailed);
        assert!(matches!(failure.source, SwapError::InvalidAmount { .. }));
    }
}
