//! Centralized Contract Definitions
//!
//! All Solidity contract interfaces for the prize vault keeper bots,
//! defined using alloy's `sol!` macro.
//!
//! Each interface is annotated with `#[sol(rpc)]` to generate
//! contract instance types that can make RPC calls via any alloy Provider.
//!
//! Author: AI-Generated
//! Created: 2026-07-21

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
    }
}

// ── Multicall3 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Result[] memory returnData);
    }
}

// ── Market rate feed ─────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IMarketRate {
        function priceFeed(address token, string calldata denominator) external view returns (uint256);
    }
}

// ── Liquidation mechanism ────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface ILiquidationPair {
        function tokenIn() external view returns (address);
        function tokenOut() external view returns (address);
        function maxAmountOut() external returns (uint256);
        function computeExactAmountIn(uint256 amountOut) external returns (uint256);
        function computeExactAmountOut(uint256 amountIn) external returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface ILiquidationRouter {
        function swapExactAmountOut(address pair, address receiver, uint256 amountOut, uint256 amountInMax) external returns (uint256 amountIn);
    }
}

// ── Prize vault (ERC-4626 share over an underlying asset) ────────────

sol! {
    #[sol(rpc)]
    interface IVault {
        function asset() external view returns (address);
    }
}

// ── Prize pool / claimer ─────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IPrizePool {
        function getLastAwardedDrawId() external view returns (uint32);
        function prizeToken() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface IClaimer {
        struct Claim {
            address vault;
            address winner;
            uint8 tier;
            uint32 prizeIndex;
        }

        function claimPrizes(uint32 drawId, Claim[] calldata claims, address feeRecipient, uint256 minFeePerClaim) external returns (uint256 totalFees);
        function computeTotalFees(uint32 drawId, uint256 claimCount) external returns (uint256);
    }
}

// ── RNG / draw auction (two stages) ──────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IRngAuction {
        function isAuctionOpen() external view returns (bool);
        function currentRewardAmount() external view returns (uint256);
        function getRngFee() external view returns (address feeToken, uint256 requestFee);
        function startRngRequest(address rewardRecipient) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IDrawAuction {
        function isAuctionOpen() external view returns (bool);
        function currentRewardAmount() external view returns (uint256);
        function completeDraw(address rewardRecipient) external;
    }
}
