//! Bindings for Uniswap V2 style routers (UniswapV2Router02, PancakeRouter, SushiSwapRouter, ...).

use alloy::{
    core::sol,
    primitives::{Address, U256},
    sol_types::SolCall,
};

use crate::erc20::DecodeError;

sol! {
    function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);

    function swapExactTokensForTokens(
        uint256 amountIn,
        uint256 amountOutMin,
        address[] calldata path,
        address to,
        uint256 deadline
    ) external returns (uint256[] memory amounts);

    function swapExactETHForTokens(
        uint256 amountOutMin,
        address[] calldata path,
        address to,
        uint256 deadline
    ) external payable returns (uint256[] memory amounts);
}

/// Encode getAmountsOut(uint256,address[]) call
pub fn encode_get_amounts_out(amount_in: U256, path: &[Address]) -> Vec<u8> {
    getAmountsOutCall { amountIn: amount_in, path: path.to_vec() }.abi_encode()
}

/// Decode getAmountsOut(uint256,address[]) return value
pub fn decode_get_amounts_out(data: &[u8]) -> Result<Vec<U256>, DecodeError> {
    getAmountsOutCall::abi_decode_returns(data)
}

/// Encode swapExactTokensForTokens(uint256,uint256,address[],address,uint256) call
pub fn encode_swap_exact_tokens_for_tokens(
    amount_in: U256,
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> Vec<u8> {
    swapExactTokensForTokensCall {
        amountIn: amount_in,
        amountOutMin: amount_out_min,
        path: path.to_vec(),
        to,
        deadline,
    }
    .abi_encode()
}

/// Encode swapExactETHForTokens(uint256,address[],address,uint256) call. The input amount is
/// the transaction value.
pub fn encode_swap_exact_eth_for_tokens(
    amount_out_min: U256,
    path: &[Address],
    to: Address,
    deadline: U256,
) -> Vec<u8> {
    swapExactETHForTokensCall { amountOutMin: amount_out_min, path: path.to_vec(), to, deadline }
        .abi_encode()
}
